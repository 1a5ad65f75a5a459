use bugninja_shared::media::{ExecutionContext, MediaUrlResolver};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

/// Convert an article body into HTML. Relative image sources are pointed at
/// the public CMS origin so the browser can load them.
pub fn render_markdown(content: &str, media: &MediaUrlResolver) -> String {
    if content.trim().is_empty() {
        return String::new();
    }

    let parser = Parser::new_ext(content, options()).map(|event| match event {
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let resolved = media.resolve(&dest_url, ExecutionContext::Browser);
            Event::Start(Tag::Image {
                link_type,
                dest_url: CowStr::from(resolved),
                title,
                id,
            })
        },
        _ => event,
    });

    let mut html_output = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut html_output, parser);
    html_output
}

/// Strip Markdown formatting, returning plain text.
pub fn strip_markdown(md: &str) -> String {
    let parser = Parser::new(md);
    let mut buf = String::with_capacity(md.len());
    let mut in_code_block = false;

    for event in parser {
        match event {
            Event::Text(t) | Event::Code(t) => buf.push_str(&t),
            Event::SoftBreak | Event::HardBreak => buf.push(' '),
            Event::Start(Tag::CodeBlock(_)) => in_code_block = true,
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                buf.push(' ');
            },
            Event::Start(Tag::Paragraph) if !buf.is_empty() && !in_code_block => {
                buf.push(' ');
            },
            _ => {},
        }
    }
    // Collapse whitespace
    buf.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut to `max_chars` characters, marking the cut with an ellipsis.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}…", truncated.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media() -> MediaUrlResolver {
        MediaUrlResolver::new("https://cms.bugninja.ai", "http://strapi:1337")
    }

    #[test]
    fn renders_gfm_and_resolves_relative_images() {
        let md = "## Results\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n![chart](/uploads/chart.png)\n\n![remote](https://img.example.com/x.png)";
        let html = render_markdown(md, &media());

        assert!(html.contains("<h2>Results</h2>"));
        assert!(html.contains("<table>"));
        assert!(html.contains(r#"src="https://cms.bugninja.ai/uploads/chart.png""#));
        assert!(html.contains(r#"src="https://img.example.com/x.png""#));
    }

    #[test]
    fn raw_html_bodies_pass_through() {
        let html = render_markdown("<p>Already <strong>HTML</strong></p>", &media());
        assert!(html.contains("<p>Already <strong>HTML</strong></p>"));
    }

    #[test]
    fn empty_body_renders_nothing() {
        assert_eq!(render_markdown("  \n", &media()), "");
    }

    #[test]
    fn strip_and_truncate() {
        let text = strip_markdown("# Title\n\nSome *emphasis* and `code`.\n\nSecond paragraph.");
        assert_eq!(text, "Title Some emphasis and code. Second paragraph.");
        assert_eq!(truncate_text("abcdef", 3), "abc…");
        assert_eq!(truncate_text("abc", 3), "abc");
    }
}
