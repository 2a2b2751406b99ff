use serde_json::{json, Value};

use crate::message::Message;

// Provider documentation:
// 企业微信 https://developer.work.weixin.qq.com/document/path/91770
// 钉钉 https://open.dingtalk.com/document/orgapp/custom-robot-access
// 蓝信 https://openapi.lanxin.cn/doc/#/quick-start/bot-dev/webhook-bot-overview

const WECOM_PREFIX: &str = "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=";
const DINGTALK_PREFIX: &str = "https://oapi.dingtalk.com/robot/send?access_token=";
const LANXIN_MARKER: &str = "/v1/bot/hook/messages/create?hook_token";

/// The webhook protocols this crate speaks, in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// WeCom (企业微信) group robot.
    Wecom,
    /// DingTalk (钉钉) custom robot.
    Dingtalk,
    /// Lanxin (蓝信) hook bot.
    Lanxin,
}

impl Provider {
    /// Resolve the provider for a webhook URL. First match wins; `None`
    /// means the target is unknown and must be skipped entirely.
    pub fn detect(url: &str) -> Option<Provider> {
        if url.starts_with(WECOM_PREFIX) {
            Some(Provider::Wecom)
        } else if url.starts_with(DINGTALK_PREFIX) {
            Some(Provider::Dingtalk)
        } else if url.find(LANXIN_MARKER).is_some_and(|pos| pos > 0) {
            Some(Provider::Lanxin)
        } else {
            None
        }
    }

    /// Name of the numeric error-code field in the provider's response
    /// body; any value other than `0` is a rejected send.
    pub fn error_code_field(&self) -> &'static str {
        match self {
            Provider::Wecom | Provider::Dingtalk => "errcode",
            Provider::Lanxin => "errCode",
        }
    }

    /// Whether the provider enforces the 20-per-minute send limit.
    pub fn rate_limited(&self) -> bool {
        matches!(self, Provider::Wecom | Provider::Dingtalk)
    }

    /// Build the POST body for one message.
    ///
    /// `timestamp_s` and `body_sign` only matter to Lanxin, which carries
    /// its signature in the body; the other providers sign (if at all) in
    /// the query string and ignore both.
    pub fn build_payload(
        &self,
        msg: &Message,
        timestamp_s: i64,
        body_sign: Option<&str>,
    ) -> Value {
        match self {
            // 20/min, content capped at 4096 bytes by the provider
            Provider::Wecom => json!({
                "msgtype": "markdown",
                "markdown": {
                    "content": msg.markdown(),
                }
            }),
            // 20/min
            Provider::Dingtalk => json!({
                "msgtype": "markdown",
                "markdown": {
                    "title": msg.title,
                    "text": msg.markdown(),
                }
            }),
            Provider::Lanxin => json!({
                "sign": body_sign,
                "timestamp": timestamp_s.to_string(),
                "msgType": "text",
                "msgData": {
                    "text": {
                        "content": msg.plain(),
                    }
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> Message {
        Message {
            feed_name: "Feed".to_string(),
            title: "Title".to_string(),
            link: "https://example.com/x".to_string(),
            show_text: "text\n".to_string(),
            only_text: false,
        }
    }

    #[test]
    fn test_detects_wecom_by_prefix() {
        let url = "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=X";
        assert_eq!(Provider::detect(url), Some(Provider::Wecom));
    }

    #[test]
    fn test_detects_dingtalk_by_prefix() {
        let url = "https://oapi.dingtalk.com/robot/send?access_token=X";
        assert_eq!(Provider::detect(url), Some(Provider::Dingtalk));
    }

    #[test]
    fn test_detects_lanxin_by_marker_substring() {
        let url = "https://apigw-example.lanxin.cn/v1/bot/hook/messages/create?hook_token=X";
        assert_eq!(Provider::detect(url), Some(Provider::Lanxin));
    }

    #[test]
    fn test_unknown_urls_match_nothing() {
        assert_eq!(Provider::detect("https://discord.com/api/webhooks/1/x"), None);
        assert_eq!(Provider::detect("https://example.com/"), None);
        // The Lanxin marker at position zero is not a valid host-relative URL.
        assert_eq!(Provider::detect("/v1/bot/hook/messages/create?hook_token=X"), None);
    }

    #[test]
    fn test_prefix_match_ignores_trailing_content() {
        // Anything after the matched prefix is the provider's business.
        let url = "https://qyapi.weixin.qq.com/cgi-bin/webhook/send?key=X&debug=/v1/bot/hook/messages/create?hook_token";
        assert_eq!(Provider::detect(url), Some(Provider::Wecom));
    }

    #[test]
    fn test_error_code_field_casing() {
        assert_eq!(Provider::Wecom.error_code_field(), "errcode");
        assert_eq!(Provider::Dingtalk.error_code_field(), "errcode");
        assert_eq!(Provider::Lanxin.error_code_field(), "errCode");
    }

    #[test]
    fn test_only_wecom_and_dingtalk_are_rate_limited() {
        assert!(Provider::Wecom.rate_limited());
        assert!(Provider::Dingtalk.rate_limited());
        assert!(!Provider::Lanxin.rate_limited());
    }

    #[test]
    fn test_wecom_payload_shape() {
        let payload = Provider::Wecom.build_payload(&message(), 0, None);
        assert_eq!(payload["msgtype"], "markdown");
        assert_eq!(
            payload["markdown"]["content"],
            "【Feed】 [Title](https://example.com/x)\n\ntext\n"
        );
    }

    #[test]
    fn test_dingtalk_payload_carries_the_title() {
        let payload = Provider::Dingtalk.build_payload(&message(), 0, None);
        assert_eq!(payload["msgtype"], "markdown");
        assert_eq!(payload["markdown"]["title"], "Title");
        assert_eq!(
            payload["markdown"]["text"],
            "【Feed】 [Title](https://example.com/x)\n\ntext\n"
        );
    }

    #[test]
    fn test_lanxin_payload_is_plain_text_with_body_signature() {
        let payload = Provider::Lanxin.build_payload(&message(), 1700000000, Some("c2ln"));
        assert_eq!(payload["sign"], "c2ln");
        assert_eq!(payload["timestamp"], "1700000000");
        assert_eq!(payload["msgType"], "text");
        assert_eq!(
            payload["msgData"]["text"]["content"],
            "【Feed】 Title\ntext\nhttps://example.com/x"
        );
    }

    #[test]
    fn test_unsigned_lanxin_payload_has_null_sign() {
        let payload = Provider::Lanxin.build_payload(&message(), 1700000000, None);
        assert!(payload["sign"].is_null());
    }

    #[test]
    fn test_only_text_message_reaches_the_payload_unwrapped() {
        let msg = Message {
            only_text: true,
            show_text: "bare text\n".to_string(),
            ..message()
        };
        let payload = Provider::Wecom.build_payload(&msg, 0, None);
        assert_eq!(payload["markdown"]["content"], "bare text");
    }
}
