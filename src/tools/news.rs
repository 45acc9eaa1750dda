//! Google News RSS 安全简报工具
//!
//! 以「目的地 + 旅行警告 / 安全提示 / 中断 / 抗议」检索 RSS，解析 <item>（title / link / pubDate / description），
//! 摘要去标签后截断到 240 字符；缺 title 或 link 的条目跳过，最多保留 max_items 条。

use std::sync::OnceLock;

use async_trait::async_trait;
use html2text::from_read;
use regex::Regex;
use reqwest::Client;

use crate::core::{Headline, ToolFailure};
use crate::tools::types::{NewsBrief, NewsQuery, ToolQuery, ToolResponse};
use crate::tools::ToolAdapter;

pub const DEFAULT_NEWS_URL: &str = "https://news.google.com/rss/search";

const SNIPPET_WIDTH: usize = 240;
const SNIPPET_PLACEHOLDER: &str = " [...]";

pub struct GoogleNewsTool {
    client: Client,
    endpoint: String,
}

fn item_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<item\b[^>]*>(.*?)</item>").expect("static regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

/// 检索语句
pub fn search_query(location: &str) -> String {
    format!("{location} travel warning OR safety advisory OR disruption OR protest")
}

/// 由语言代码推导 hl / gl / ceid 参数
fn locale_params(language: &str) -> (String, String, String) {
    let gl = language.rsplit('-').next().unwrap_or(language).to_string();
    (language.to_string(), gl, language.replace('-', ":"))
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// 取块内第一个 <name>…</name> 的文本，处理 CDATA 与实体
fn element_text(block: &str, name: &str) -> Option<String> {
    let open = format!("<{name}");
    let close = format!("</{name}>");
    let start = block.find(&open)?;
    let after_open = start + block[start..].find('>')? + 1;
    let end = after_open + block[after_open..].find(&close)?;
    let raw = block[after_open..end].trim();
    let raw = raw
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
        .unwrap_or(raw);
    Some(unescape(raw).trim().to_string())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 描述可能含 HTML（Google News 为锚点列表），转为纯文本
fn plain_text(html: &str) -> String {
    let html = html.replace("<br>", " ");
    let text = match from_read(html.as_bytes(), 10_000) {
        Ok(text) if !text.trim().is_empty() => text,
        _ => tag_regex().replace_all(&html, " ").into_owned(),
    };
    collapse_whitespace(&text)
}

/// 按词边界截断，超长时追加 " [...]"，结果不超过 width 字符
fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let budget = width.saturating_sub(SNIPPET_PLACEHOLDER.chars().count());
    let mut out = String::new();
    for word in text.split(' ') {
        let extra = if out.is_empty() { 0 } else { 1 };
        if out.chars().count() + extra + word.chars().count() > budget {
            break;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    format!("{}{}", out, SNIPPET_PLACEHOLDER).trim_start().to_string()
}

/// 解析 RSS 文本为头条列表
fn parse_rss(body: &str, max_items: usize) -> Result<Vec<Headline>, ToolFailure> {
    if !body.contains("<rss") && !body.contains("<channel") {
        return Err(ToolFailure::InvalidResponse("response is not an RSS feed".to_string()));
    }
    let headlines = item_regex()
        .captures_iter(body)
        .filter_map(|cap| {
            let block = cap.get(1)?.as_str();
            let title = element_text(block, "title").unwrap_or_default();
            let link = element_text(block, "link").unwrap_or_default();
            if title.is_empty() || link.is_empty() {
                return None;
            }
            let published = element_text(block, "pubDate").unwrap_or_default();
            let description = element_text(block, "description").unwrap_or_default();
            Some(Headline {
                title,
                link,
                published,
                snippet: shorten(&plain_text(&description), SNIPPET_WIDTH),
            })
        })
        .take(max_items)
        .collect();
    Ok(headlines)
}

impl GoogleNewsTool {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder()
            .user_agent("hive-trip-assistant/0.1")
            .build()
            .unwrap_or_default();
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn fetch(&self, query: NewsQuery) -> Result<NewsBrief, ToolFailure> {
        let location = query.location.trim();
        if location.is_empty() {
            return Err(ToolFailure::Unavailable("location is required".to_string()));
        }
        let (hl, gl, ceid) = locale_params(&query.language);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", search_query(location)),
                ("hl", hl),
                ("gl", gl),
                ("ceid", ceid),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                if e.is_timeout() {
                    ToolFailure::Timeout(e.to_string())
                } else {
                    ToolFailure::Unavailable(e.to_string())
                }
            })?;
        let body = response
            .text()
            .await
            .map_err(|e| ToolFailure::InvalidResponse(e.to_string()))?;

        let headlines = parse_rss(&body, query.max_items.max(1))?;
        if headlines.is_empty() {
            tracing::warn!(location, "no safety headlines in feed");
            return Err(ToolFailure::Unavailable(format!(
                "Unable to find recent safety headlines for '{location}'"
            )));
        }

        Ok(NewsBrief {
            location: location.to_string(),
            headlines,
            source: "Google News RSS".to_string(),
        })
    }
}

impl Default for GoogleNewsTool {
    fn default() -> Self {
        Self::new(DEFAULT_NEWS_URL)
    }
}

#[async_trait]
impl ToolAdapter for GoogleNewsTool {
    fn name(&self) -> &str {
        "news"
    }

    fn description(&self) -> &str {
        "Recent safety-related headlines for a destination (Google News RSS). Query: location, max_items, language"
    }

    async fn call(&self, query: ToolQuery) -> Result<ToolResponse, ToolFailure> {
        match query {
            ToolQuery::News(q) => self.fetch(q).await.map(ToolResponse::News),
            other => Err(ToolFailure::InvalidResponse(format!(
                "news tool cannot answer {} queries",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Goa safety</title>
<item><title>Protest blocks highway near Panaji</title><link>https://news.example/1</link>
<pubDate>Sat, 17 Oct 2026 08:00:00 GMT</pubDate>
<description>&lt;a href="https://news.example/1"&gt;Protest blocks highway&lt;/a&gt;&amp;nbsp;&lt;font&gt;Herald&lt;/font&gt;</description></item>
<item><title><![CDATA[Beach festival draws record crowds]]></title><link>https://news.example/2</link>
<pubDate>Fri, 16 Oct 2026 10:00:00 GMT</pubDate><description>Crowds &amp; music</description></item>
<item><title>Untitled without link</title></item>
<item><title>Third story</title><link>https://news.example/3</link></item>
</channel></rss>"#;

    #[test]
    fn test_parse_rss_items() {
        let headlines = parse_rss(FEED, 4).unwrap();
        assert_eq!(headlines.len(), 3);
        assert_eq!(headlines[0].title, "Protest blocks highway near Panaji");
        assert_eq!(headlines[0].published, "Sat, 17 Oct 2026 08:00:00 GMT");
        assert!(headlines[0].snippet.contains("Protest blocks highway"));
        assert!(!headlines[0].snippet.contains("<a"));
        assert_eq!(headlines[1].title, "Beach festival draws record crowds");
        assert!(headlines[1].snippet.contains("Crowds & music"));
    }

    #[test]
    fn test_parse_rss_respects_max_items() {
        let headlines = parse_rss(FEED, 1).unwrap();
        assert_eq!(headlines.len(), 1);
    }

    #[test]
    fn test_parse_rss_rejects_non_feed() {
        let err = parse_rss("<html><body>captcha</body></html>", 4).unwrap_err();
        assert!(matches!(err, ToolFailure::InvalidResponse(_)));
    }

    #[test]
    fn test_shorten_on_word_boundary() {
        let long = "word ".repeat(100);
        let short = shorten(long.trim(), 40);
        assert!(short.chars().count() <= 40);
        assert!(short.ends_with("[...]"));
        assert_eq!(shorten("brief", 40), "brief");
    }

    #[test]
    fn test_locale_params() {
        let (hl, gl, ceid) = locale_params("en-US");
        assert_eq!(hl, "en-US");
        assert_eq!(gl, "US");
        assert_eq!(ceid, "en:US");
        assert!(search_query("Goa").starts_with("Goa travel warning"));
    }
}
