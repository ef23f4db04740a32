//! M3U playlist parser with HTTPS download support

use std::collections::HashSet;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::models::{Channel, DEFAULT_GROUP};
use crate::playback::DEFAULT_USER_AGENT;

const EXTINF: &str = "#EXTINF";
// Both spellings occur in the wild
const REFERER_PREFIXES: [&str; 2] = ["#EXTVLCOPT:http-referrer=", "#EXTVLCOPT:http-referer="];
const USER_AGENT_PREFIX: &str = "#EXTVLCOPT:http-user-agent=";
const EXTHTTP_PREFIX: &str = "#EXTHTTP:";
const URL_PREFIX: &str = "http";

/// Handling of a stream line that has no fresh `#EXTINF` block of its own:
/// a second URL right after an emitted channel, or a URL before any metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrphanUrlPolicy {
    /// Emit another channel with the fields accumulated so far
    #[default]
    Reuse,
    /// Drop the line
    Skip,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    pub orphan_urls: OrphanUrlPolicy,
}

/// Settings for the single playlist GET
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// Download the playlist text (HTTP and HTTPS)
pub fn download_playlist(url: &str, config: &FetchConfig) -> Result<String, FetchError> {
    let agent = ureq::Agent::config_builder()
        .timeout_global(Some(config.timeout))
        .timeout_connect(Some(config.connect_timeout))
        .build()
        .new_agent();

    let mut response = agent
        .get(url)
        .header("User-Agent", config.user_agent.as_str())
        .call()
        .map_err(|e| match e {
            ureq::Error::StatusCode(code) => FetchError::Status(code),
            other => FetchError::Request(other),
        })?;

    if !response.status().is_success() {
        return Err(FetchError::Status(response.status().as_u16()));
    }

    response
        .body_mut()
        .read_to_string()
        .map_err(FetchError::Read)
}

/// Download and parse M3U from URL
pub fn download_and_parse(
    url: &str,
    config: &FetchConfig,
    options: &ParseOptions,
) -> Result<Vec<Channel>, FetchError> {
    info!("Fetching playlist from {}", url);
    let content = download_playlist(url, config)?;
    let channels = parse_m3u_with(&content, options);
    info!(
        "Loaded {} channels in {} categories",
        channels.len(),
        categories(&channels).len()
    );
    Ok(channels)
}

/// Parse M3U content and extract channels
pub fn parse_m3u(content: &str) -> Vec<Channel> {
    parse_m3u_with(content, &ParseOptions::default())
}

/// Parse M3U content with an explicit policy for orphan stream lines
pub fn parse_m3u_with(content: &str, options: &ParseOptions) -> Vec<Channel> {
    let mut channels = Vec::new();
    let mut state = ParseState::Idle(ChannelDraft::default());

    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        let line_no = index + 1;

        state = match (state, classify(line)) {
            (_, LineKind::Metadata) => ParseState::Pending(ChannelDraft::from_extinf(line)),
            (ParseState::Idle(mut draft), LineKind::Directive(directive)) => {
                draft.apply(directive);
                ParseState::Idle(draft)
            }
            (ParseState::Pending(mut draft), LineKind::Directive(directive)) => {
                draft.apply(directive);
                ParseState::Pending(draft)
            }
            (ParseState::Emitted(mut draft), LineKind::Directive(directive)) => {
                draft.apply(directive);
                ParseState::Emitted(draft)
            }
            (ParseState::Pending(draft), LineKind::Url) => {
                channels.push(draft.finish(line));
                ParseState::Emitted(draft)
            }
            (ParseState::Idle(draft), LineKind::Url) => {
                if emit_orphan(options.orphan_urls, &mut channels, &draft, line, line_no) {
                    ParseState::Emitted(draft)
                } else {
                    ParseState::Idle(draft)
                }
            }
            (ParseState::Emitted(draft), LineKind::Url) => {
                emit_orphan(options.orphan_urls, &mut channels, &draft, line, line_no);
                ParseState::Emitted(draft)
            }
            (state, LineKind::Ignored) => state,
        };
    }

    debug!("Parsed {} channels", channels.len());
    channels
}

// Returns whether the stream line was emitted
fn emit_orphan(
    policy: OrphanUrlPolicy,
    channels: &mut Vec<Channel>,
    draft: &ChannelDraft,
    line: &str,
    line_no: usize,
) -> bool {
    match policy {
        OrphanUrlPolicy::Reuse => {
            channels.push(draft.finish(line));
            true
        }
        OrphanUrlPolicy::Skip => {
            debug!("Skipping stream line {} without metadata: {}", line_no, line);
            false
        }
    }
}

/// Distinct channel groups in order of first appearance
pub fn categories(channels: &[Channel]) -> Vec<String> {
    let mut seen = HashSet::new();
    channels
        .iter()
        .filter(|c| seen.insert(c.group.as_str()))
        .map(|c| c.group.clone())
        .collect()
}

/// Extract `key="value"` from a metadata line.
/// Returns `None` when the key is missing, the closing quote is missing,
/// or the value is empty.
pub fn extract_quoted_attr(line: &str, key: &str) -> Option<String> {
    let marker = format!("{}=\"", key);
    let start = line.find(&marker)? + marker.len();
    let rest = &line[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string()).filter(|v| !v.is_empty())
}

/// Channel name: everything after the last comma, trimmed
pub fn extract_name(line: &str) -> Option<String> {
    let comma_pos = line.rfind(',')?;
    Some(line[comma_pos + 1..].trim().to_string())
}

/// Remainder of a directive line after its prefix
pub fn extract_directive(line: &str, prefix: &str) -> Option<String> {
    line.strip_prefix(prefix)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Cookie from an `#EXTHTTP:{...}` line. Only the `cookie` key is read.
pub fn extract_cookie(line: &str) -> Option<String> {
    let payload = line.strip_prefix(EXTHTTP_PREFIX)?.trim();
    let value: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(e) => {
            debug!("Ignoring malformed #EXTHTTP payload: {}", e);
            return None;
        }
    };

    let cookie = match value.get("cookie")? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    Some(cookie).filter(|c| !c.is_empty())
}

enum Directive {
    Referer(String),
    UserAgent(String),
    Cookie(String),
}

enum LineKind {
    Metadata,
    Directive(Option<Directive>),
    Url,
    Ignored,
}

fn classify(line: &str) -> LineKind {
    if line.is_empty() {
        return LineKind::Ignored;
    }
    if line.starts_with(EXTINF) {
        return LineKind::Metadata;
    }
    if let Some(prefix) = REFERER_PREFIXES.iter().find(|p| line.starts_with(*p)) {
        return LineKind::Directive(extract_directive(line, prefix).map(Directive::Referer));
    }
    if line.starts_with(USER_AGENT_PREFIX) {
        return LineKind::Directive(
            extract_directive(line, USER_AGENT_PREFIX).map(Directive::UserAgent),
        );
    }
    if line.starts_with(EXTHTTP_PREFIX) {
        return LineKind::Directive(extract_cookie(line).map(Directive::Cookie));
    }
    if line.starts_with(URL_PREFIX) {
        return LineKind::Url;
    }
    LineKind::Ignored
}

/// Fields collected for the channel currently being read
#[derive(Debug, Clone, Default)]
struct ChannelDraft {
    name: String,
    logo: Option<String>,
    group: Option<String>,
    referer: Option<String>,
    user_agent: Option<String>,
    cookie: Option<String>,
}

impl ChannelDraft {
    fn from_extinf(line: &str) -> Self {
        Self {
            name: extract_name(line).unwrap_or_default(),
            logo: extract_quoted_attr(line, "tvg-logo"),
            group: extract_quoted_attr(line, "group-title"),
            ..Self::default()
        }
    }

    // A directive that yielded no value leaves the field as it was
    fn apply(&mut self, directive: Option<Directive>) {
        match directive {
            Some(Directive::Referer(v)) => self.referer = Some(v),
            Some(Directive::UserAgent(v)) => self.user_agent = Some(v),
            Some(Directive::Cookie(v)) => self.cookie = Some(v),
            None => {}
        }
    }

    fn finish(&self, url: &str) -> Channel {
        Channel {
            name: self.name.clone(),
            logo: self.logo.clone(),
            group: self
                .group
                .clone()
                .unwrap_or_else(|| DEFAULT_GROUP.to_string()),
            url: url.to_string(),
            referer: self.referer.clone(),
            user_agent: self.user_agent.clone(),
            cookie: self.cookie.clone(),
        }
    }
}

/// Scanner state between lines
enum ParseState {
    /// No `#EXTINF` read yet; holds directives seen so far
    Idle(ChannelDraft),
    /// Metadata or directives read, no stream line yet
    Pending(ChannelDraft),
    /// A channel was emitted; its fields are kept for orphan stream lines
    Emitted(ChannelDraft),
}

#[cfg(test)]
#[path = "m3u_parser_tests.rs"]
mod tests;
