//! Integration tests
//!
//! Every test runs the real HTTP fetcher against a local `wiremock` server.

mod crawl_tests;
mod export_tests;

use sumi_scribe::config::{parse_config, Config};

/// Builds a validated configuration seeded with `seed`
///
/// `extra` is appended to the generated TOML and may contain any section.
pub fn test_config(seed: &str, extra: &str) -> Config {
    let toml = format!(
        r#"
seeds = ["{seed}"]

[user-agent]
crawler-name = "TestBot"
crawler-version = "2.0"

{extra}
"#
    );
    parse_config(&toml).expect("test config must parse")
}

/// An article page that the heuristic extractor accepts
pub fn article_html(title: &str, image: Option<&str>) -> String {
    let image = image
        .map(|src| format!(r#"<img src="{}">"#, src))
        .unwrap_or_default();
    format!(
        r#"<html><body>
        <nav><a href="/">Home</a></nav>
        <article>
          <p>{title} opens the match.</p>
          <p>{title} presses high.</p>
          <p>{title} wins the ball back.</p>
          <p>{title} scores.</p>
        </article>
        {image}
        </body></html>"#
    )
}
