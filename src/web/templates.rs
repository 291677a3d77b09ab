use chrono::{Datelike, Utc};

const SITE_BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; }
        header.site { background: #ffffff; border-bottom: 1px solid #e2e8f0; }
        .site-bar { max-width: 960px; margin: 0 auto; padding: 1.25rem 1.5rem; display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; }
        .site-name { font-size: 1.15rem; font-weight: 700; color: #0f172a; text-decoration: none; }
        nav.site-nav { display: flex; gap: 1.25rem; flex-wrap: wrap; }
        nav.site-nav a { color: #334155; text-decoration: none; font-weight: 600; font-size: 0.95rem; }
        nav.site-nav a:hover { color: #1d4ed8; }
        main { padding: 2rem 1.5rem; max-width: 960px; margin: 0 auto; box-sizing: border-box; }
        section { margin-bottom: 2.5rem; }
        h1 { font-size: 1.8rem; margin: 0 0 1rem; }
        h2 { font-size: 1.3rem; margin: 0 0 0.75rem; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); }
        .card-list { display: grid; gap: 1rem; }
        .card { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.25rem; }
        .card h3 { margin: 0 0 0.4rem; font-size: 1.05rem; }
        .muted { color: #475569; font-size: 0.95rem; line-height: 1.6; }
        .tag { display: inline-block; background: #e0f2fe; color: #1d4ed8; border-radius: 999px; padding: 0.15rem 0.7rem; font-size: 0.8rem; font-weight: 600; margin-right: 0.4rem; }
        .pub-year { margin: 1.75rem 0 0.75rem; font-size: 1.1rem; color: #1d4ed8; }
        .pub-entry { padding: 0.65rem 0; border-bottom: 1px solid #e2e8f0; }
        .pub-entry:last-child { border-bottom: none; }
        .pub-title { font-weight: 600; }
        .pub-links a { color: #2563eb; text-decoration: none; margin-right: 0.75rem; font-size: 0.9rem; }
        .pub-links a:hover { text-decoration: underline; }
        .people-group { margin-bottom: 2rem; }
        .person { padding: 0.6rem 0; border-bottom: 1px solid #e2e8f0; }
        .person:last-child { border-bottom: none; }
        .person .name { font-weight: 600; }
        .news-item { padding: 0.75rem 0; border-bottom: 1px solid #e2e8f0; }
        .news-item:last-child { border-bottom: none; }
        .news-date { color: #64748b; font-size: 0.85rem; }
        .news-item a { color: #0f172a; text-decoration: none; font-weight: 600; }
        .news-item a:hover { color: #1d4ed8; }
        .news-body p { line-height: 1.7; }
        .app-footer { margin: 3rem auto 2rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
        @media (max-width: 768px) {
            .site-bar { flex-direction: column; align-items: flex-start; }
            main { padding: 1.5rem 1rem; }
        }
"#;

const NAV_LINKS: [(&str, &str); 5] = [
    ("/research", "Research"),
    ("/publications", "Publications"),
    ("/people", "People"),
    ("/news", "News"),
    ("/admin/publications", "Admin"),
];

pub const SITE_NAME: &str = "Urban Soundscape Lab";

/// Shared public-page shell. The CSP forbids inline tags without the
/// request's nonce, so both the style block and any page script must carry it.
pub fn render_page(meta_title: &str, nonce: &str, main_html: &str) -> String {
    let nav = NAV_LINKS
        .iter()
        .map(|(href, label)| format!(r#"<a href="{href}">{label}</a>"#))
        .collect::<Vec<_>>()
        .join("\n            ");
    let footer = render_footer();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{meta_title}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style nonce="{nonce}">
{SITE_BASE_STYLES}
    </style>
</head>
<body>
    <header class="site">
        <div class="site-bar">
            <a class="site-name" href="/">{SITE_NAME}</a>
            <nav class="site-nav">
            {nav}
            </nav>
        </div>
    </header>
    <main>
{main_html}
    </main>
    {footer}
</body>
</html>"#
    )
}

pub fn render_footer() -> String {
    let current_year = Utc::now().year();
    format!(
        r#"<footer class="app-footer">© 2018-{year} {SITE_NAME}, Seoul National University</footer>"#,
        year = current_year
    )
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_shell_carries_nonce_on_style_block() {
        let page = render_page("Test", "n0nce", "<p>hi</p>");
        assert!(page.contains(r#"<style nonce="n0nce">"#));
        assert!(page.contains("<p>hi</p>"));
    }

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<b a="1">&'"#),
            "&lt;b a=&quot;1&quot;&gt;&amp;&#39;"
        );
    }
}
