use crafthall_core::{Incoming, Invoker};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "post_type")]
pub enum OneBotEvent {
    #[serde(rename = "message")]
    Message(MessageEvent),
    #[serde(rename = "meta_event")]
    Meta(MetaEvent),
    #[serde(rename = "notice")]
    Notice(serde_json::Value),
    #[serde(rename = "request")]
    Request(serde_json::Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub message_type: String, // "private" or "group"
    pub sub_type: Option<String>,
    pub message_id: i64,
    pub user_id: i64,
    pub group_id: Option<i64>,
    pub raw_message: String,
    #[serde(default)]
    pub font: i32,
    pub sender: Sender,
    pub time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sender {
    pub user_id: Option<i64>,
    pub nickname: Option<String>,
    pub card: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "meta_event_type")]
pub enum MetaEvent {
    #[serde(rename = "heartbeat")]
    Heartbeat {
        time: i64,
        status: serde_json::Value,
        interval: i64,
    },
    #[serde(rename = "lifecycle")]
    Lifecycle {
        time: i64,
        sub_type: String,
    },
}

#[derive(Debug, Serialize)]
pub struct SendMessageAction {
    pub action: String,
    pub params: SendMessageParams,
}

#[derive(Debug, Serialize)]
pub struct SendMessageParams {
    pub message_type: String,
    pub user_id: Option<i64>,
    pub group_id: Option<i64>,
    pub message: String,
    /// Send `message` as plain text, without interpreting CQ codes.
    pub auto_escape: bool,
}

/// Result of an action, echoed back on the same socket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneBotResponse {
    pub status: String,
    pub retcode: i32,
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub wording: String,
    pub echo: Option<String>,
}

// ============================================================================
// Normalized messages
// ============================================================================

/// Where a message came from, and so where replies go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Private(i64),
    Group(i64),
}

impl Channel {
    pub fn send_action(self, message: &str) -> SendMessageAction {
        let (action, message_type, user_id, group_id) = match self {
            Channel::Private(user) => ("send_private_msg", "private", Some(user), None),
            Channel::Group(group) => ("send_group_msg", "group", None, Some(group)),
        };
        SendMessageAction {
            action: action.to_string(),
            params: SendMessageParams {
                message_type: message_type.to_string(),
                user_id,
                group_id,
                message: message.to_string(),
                auto_escape: true,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub channel: Channel,
    pub incoming: Incoming,
}

impl MessageEvent {
    /// Group card, then nickname, then the numeric id.
    pub fn display_name(&self) -> String {
        [&self.sender.card, &self.sender.nickname]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.user_id.to_string())
    }

    pub fn channel(&self) -> Channel {
        match self.group_id {
            Some(group_id) if self.message_type == "group" => Channel::Group(group_id),
            _ => Channel::Private(self.user_id),
        }
    }

    pub fn into_inbound(self) -> InboundMessage {
        let author = Invoker {
            id: self.user_id,
            display_name: self.display_name(),
        };
        InboundMessage {
            channel: self.channel(),
            incoming: Incoming {
                author,
                text: normalize_message(&self.raw_message),
            },
        }
    }
}

static AT_CODE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[CQ:at,qq=(\d+)[^\]]*\]").expect("valid at-code pattern")
});

/// Rewrite `[CQ:at,qq=N]` mentions to `<@N>` and undo CQ text escaping.
pub fn normalize_message(raw: &str) -> String {
    AT_CODE
        .replace_all(raw, "<@$1>")
        .replace("&#91;", "[")
        .replace("&#93;", "]")
        .replace("&#44;", ",")
        .replace("&amp;", "&")
}
