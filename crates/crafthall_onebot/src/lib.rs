pub mod client;
pub mod event;

pub use client::OneBotClient;
pub use event::{Channel, InboundMessage};

use anyhow::Result;
use async_trait::async_trait;
use crafthall_core::Reply;

/// Replies into the private chat or group a message came from.
pub struct ChannelReply {
    client: OneBotClient,
    channel: Channel,
}

impl ChannelReply {
    pub fn new(client: OneBotClient, channel: Channel) -> Self {
        Self { client, channel }
    }
}

#[async_trait]
impl Reply for ChannelReply {
    async fn reply(&self, text: &str) -> Result<()> {
        self.client.send(self.channel, text).await
    }
}
