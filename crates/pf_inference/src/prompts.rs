//! Prompt templates. Placeholders are `{name}` and are filled by [`render`].

pub const PROFILE_MARKER: &str = "Profile:";
pub const ARTICLE_MARKER: &str = "Article:";

/// Profile-comparison prompt. Must end with the article so the verdict is
/// about the text that precedes it.
pub const FIT_TEMPLATE: &str = r#"You will receive two inputs: a profile description and an article. Decide whether the person described would find the article relevant, interesting, and worth sharing on their social media.
Be strict: answer "Yes" only if the article clearly aligns with the interests, professional focus, or sharing habits in the profile. Otherwise answer "No".
Reply with "Yes" or "No" and nothing else.

Profile:
"{profile}"

Article:
"{article}"
"#;

pub const THREAD_TEMPLATE: &str = r#"You write Twitter threads about business, data analytics, AI and related news.

Thread structure:
1. Hook (first tweet): a bold statement or question about the main topic that makes clear this is news. Under 280 characters.
2. Body (middle tweets): the key facts, figures and quotes from the articles, one point per tweet, each under 280 characters.
3. Call to action (final tweet): invite replies or follows, under 280 characters.

Stick to facts found in the articles. Separate tweets with a blank line and add no numbering, headers or commentary.

You are given one primary article and secondary articles that it links to. Write the thread about the primary article and use the secondary articles for context.

** Primary Article **
{primary}

** Secondary Articles **
{secondary}
"#;

pub const SUMMARY_TEMPLATE: &str = r#"Summarize the following web page in 3-4 sentences (100-150 words).
Cover the main topic, its key implications, and the most important facts or figures. Be factual, avoid marketing language, and leave out the author, publication date and company background.
Return only the summary text.

{content}
"#;

pub const EXTRACTION_TEMPLATE: &str = r#"Below are the text blocks of a web page that contains an article. Reconstruct the article text.
- Keep only the article itself: drop navigation, ads, related posts, social links and comments.
- Keep the author's words; add no commentary and do not repeat content.
- Use # for the title and ## for subheadings, and keep paragraphs and lists.

Page: {url}

{content}
"#;

pub const INDEX_TEMPLATE: &str = r#"You are looking at the links of a page that lists multiple articles, such as a blog index or news homepage.
Pick every link that points to an individual article in the main content. Skip navigation, footer, sidebar, advertisement, author, category and tag links.
Answer with a JSON array of objects with "url" and "title" fields and nothing else. Keep relative URLs as they are.

Page: {url}

Links:
{links}
"#;

pub const RELATED_LINKS_TEMPLATE: &str = r#"You are looking at the links of a page that contains one article.
Pick the links in the article body that point to other articles relevant to it, at most {limit} of them. Skip navigation, headers, footers and advertisements.
Answer with a JSON array of objects with "url" and "title" fields and nothing else.

Page: {url}

Links:
{links}
"#;

/// Fill `{name}` placeholders in one pass. Values are inserted verbatim, so a
/// value containing `{other}` is never expanded. Unknown placeholders are kept.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let name_len = after
            .find('}')
            .filter(|&end| after[..end].chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

        match name_len.and_then(|end| {
            values
                .iter()
                .find(|(key, _)| *key == &after[..end])
                .map(|(_, value)| (end, *value))
        }) {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Longest prefix of `text` with at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
