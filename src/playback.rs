//! Stream request handed to the external player

use url::Url;

use crate::models::Channel;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Everything the player needs to open a channel's stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackRequest {
    pub url: String,
    pub user_agent: String,
    /// Header name/value pairs in the order they are sent
    pub headers: Vec<(String, String)>,
    pub allow_cross_protocol_redirects: bool,
}

impl PlaybackRequest {
    pub fn for_channel(channel: &Channel) -> Self {
        let user_agent = non_empty(&channel.user_agent)
            .unwrap_or(DEFAULT_USER_AGENT)
            .to_string();

        let mut headers = vec![("User-Agent".to_string(), user_agent.clone())];

        if let Some(referer) = non_empty(&channel.referer) {
            headers.push(("Referer".to_string(), referer.to_string()));
            if let Some(origin) = origin_for(referer) {
                headers.push(("Origin".to_string(), origin));
            }
        }

        if let Some(cookie) = non_empty(&channel.cookie) {
            headers.push(("Cookie".to_string(), cookie.to_string()));
        }

        Self {
            url: channel.url.clone(),
            user_agent,
            headers,
            allow_cross_protocol_redirects: true,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// `https://<host>` of the referer; always https regardless of the referer's scheme
fn origin_for(referer: &str) -> Option<String> {
    let parsed = Url::parse(referer).ok()?;
    parsed.host_str().map(|host| format!("https://{}", host))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Video scaling mode, cycled by the aspect-ratio button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    #[default]
    Fit,
    Zoom,
    Fill,
}

impl ResizeMode {
    pub fn next(&self) -> Self {
        match self {
            ResizeMode::Fit => ResizeMode::Zoom,
            ResizeMode::Zoom => ResizeMode::Fill,
            ResizeMode::Fill => ResizeMode::Fit,
        }
    }

    /// Get human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            ResizeMode::Fit => "Original Size",
            ResizeMode::Zoom => "Zoom (Crop)",
            ResizeMode::Fill => "Fill Screen",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_GROUP;

    fn channel() -> Channel {
        Channel {
            name: "BBC".to_string(),
            logo: None,
            group: DEFAULT_GROUP.to_string(),
            url: "http://stream/bbc.m3u8".to_string(),
            referer: None,
            user_agent: None,
            cookie: None,
        }
    }

    #[test]
    fn test_default_user_agent_only() {
        let request = PlaybackRequest::for_channel(&channel());
        assert_eq!(request.url, "http://stream/bbc.m3u8");
        assert_eq!(request.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(
            request.headers,
            vec![("User-Agent".to_string(), DEFAULT_USER_AGENT.to_string())]
        );
        assert!(request.allow_cross_protocol_redirects);
    }

    #[test]
    fn test_all_headers() {
        let mut ch = channel();
        ch.user_agent = Some("MyUA".to_string());
        ch.referer = Some("http://site.com:8080/player?id=1".to_string());
        ch.cookie = Some("sid=123".to_string());

        let request = PlaybackRequest::for_channel(&ch);
        let names: Vec<&str> = request.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["User-Agent", "Referer", "Origin", "Cookie"]);
        assert_eq!(request.header("user-agent"), Some("MyUA"));
        assert_eq!(request.header("Referer"), Some("http://site.com:8080/player?id=1"));
        assert_eq!(request.header("Origin"), Some("https://site.com"));
        assert_eq!(request.header("Cookie"), Some("sid=123"));
    }

    #[test]
    fn test_empty_values_are_not_sent() {
        let mut ch = channel();
        ch.user_agent = Some(String::new());
        ch.referer = Some(String::new());
        ch.cookie = Some(String::new());

        let request = PlaybackRequest::for_channel(&ch);
        assert_eq!(request.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn test_unparseable_referer_has_no_origin() {
        let mut ch = channel();
        ch.referer = Some("not a url".to_string());

        let request = PlaybackRequest::for_channel(&ch);
        assert_eq!(request.header("Referer"), Some("not a url"));
        assert_eq!(request.header("Origin"), None);
    }

    #[test]
    fn test_resize_mode_cycle() {
        let mut mode = ResizeMode::default();
        assert_eq!(mode.label(), "Original Size");
        mode = mode.next();
        assert_eq!(mode, ResizeMode::Zoom);
        assert_eq!(mode.label(), "Zoom (Crop)");
        mode = mode.next();
        assert_eq!(mode.label(), "Fill Screen");
        assert_eq!(mode.next(), ResizeMode::Fit);
    }
}
