// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! HTML transcripts of ticket channels.
//!
//! [`render`] turns a channel's message history into a standalone HTML page
//! with attachments as plain links. [`inline_attachments`] then rewrites that
//! page so each attachment link becomes an element carrying the file itself
//! as a `data:` URI, which keeps the archived transcript readable after the
//! channel and its attachments are gone.
//!
//! Rendered message layout:
//!
//! ```text
//! <div class="chatlog__message" data-message-id="ID">
//!   ...
//!   <div class="chatlog__embed">...</div>
//!   <div class="chatlog__attachments">
//!     <a class="chatlog__attachment" href="URL">name</a>
//!   </div>
//! <!-- /chatlog__message ID --></div>
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ticket::Id;

const OCTET_STREAM: &str = "application/octet-stream";
const ATTACHMENTS_OPEN: &str = r#"<div class="chatlog__attachments">"#;
const MEDIA_STYLE: &str = "max-width:100%; display:block; margin-top:10px; border-radius:5px;";
const FILE_STYLE: &str = "display:block; margin-top:10px; font-weight:bold; color:#00b0f4;";

const STYLESHEET: &str = "body{background:#36393e;color:#dcddde;font-family:Helvetica,Arial,sans-serif;font-size:15px;margin:0;padding:0 16px}\
.preamble{padding:16px 0;border-bottom:1px solid #4f545c}\
.preamble__title{font-size:20px;font-weight:bold}\
.chatlog__message{display:flex;padding:8px 0}\
.chatlog__avatar{width:40px;height:40px;border-radius:50%;margin-right:16px}\
.chatlog__author{font-weight:bold;color:#fff}\
.chatlog__timestamp{margin-left:8px;font-size:12px;color:#a3a6aa}\
.chatlog__content{white-space:normal;word-wrap:break-word}\
.chatlog__embed{margin-top:6px;padding:8px 12px;border-left:4px solid #5865f2;background:#2f3136;border-radius:4px;max-width:520px}\
.chatlog__embed-author,.chatlog__embed-title,.chatlog__embed-field-name{font-weight:bold;color:#fff}\
.chatlog__embed-footer{margin-top:6px;font-size:12px;color:#a3a6aa}\
.chatlog__attachment{color:#00b0f4}\
.postamble{padding:16px 0;border-top:1px solid #4f545c;font-size:12px;color:#a3a6aa}";

/// Page-level information shown above the messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptHeader {
    pub guild_name: String,
    pub channel_name: String,
    pub channel_id: Id,
    pub generated_at: DateTime<Utc>,
}

/// An attachment as referenced by a message (not yet downloaded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    pub id: Id,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: u64,
}

/// One message of channel history, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptMessage {
    pub id: Id,
    pub author_id: Id,
    pub author_name: String,
    pub avatar_url: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub embeds: Vec<TranscriptEmbed>,
    pub attachments: Vec<AttachmentRef>,
}

/// The readable parts of a rich embed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptEmbed {
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// `(name, value)` pairs in display order.
    pub fields: Vec<(String, String)>,
    pub footer: Option<String>,
}

/// A downloaded attachment ready to be embedded into the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineAttachment {
    pub message_id: Id,
    /// The URL the attachment link was rendered with.
    pub url: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// How an attachment is embedded, by top-level MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Video,
    File,
}

impl AttachmentKind {
    pub fn from_content_type(content_type: &str) -> Self {
        match content_type.split('/').next().unwrap_or_default() {
            "image" => AttachmentKind::Image,
            "video" => AttachmentKind::Video,
            _ => AttachmentKind::File,
        }
    }
}

/// The lowercased `type/subtype` of a MIME type, or `None` when it is not
/// made of RFC 6838 name characters. Parameters are dropped.
pub fn mime_essence(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next()?.trim();
    let (kind, subtype) = essence.split_once('/')?;
    let is_name = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&^_.+-".contains(c))
    };
    (is_name(kind) && is_name(subtype)).then(|| essence.to_ascii_lowercase())
}

/// The declared content type, else a guess from the extension, else
/// `application/octet-stream`.
pub fn content_type_for(filename: &str, declared: Option<&str>) -> String {
    match declared.and_then(mime_essence) {
        Some(d) => d,
        None => mime_guess::from_path(filename)
            .first_raw()
            .unwrap_or(OCTET_STREAM)
            .to_string(),
    }
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn message_end_marker(id: Id) -> String {
    format!("<!-- /chatlog__message {id} -->")
}

fn attachment_link(attachment: &AttachmentRef) -> String {
    format!(
        r#"<a class="chatlog__attachment" href="{}">{}</a>"#,
        escape(&attachment.url),
        escape(&attachment.filename)
    )
}

fn render_embed(out: &mut String, embed: &TranscriptEmbed) {
    out.push_str("<div class=\"chatlog__embed\">\n");
    let parts = [
        ("author", &embed.author),
        ("title", &embed.title),
        ("description", &embed.description),
    ];
    for (class, text) in parts {
        if let Some(text) = text {
            out.push_str(&format!(
                r#"<div class="chatlog__embed-{class}">{}</div>"#,
                multiline(text)
            ));
            out.push('\n');
        }
    }
    for (name, value) in &embed.fields {
        out.push_str(&format!(
            r#"<div class="chatlog__embed-field"><div class="chatlog__embed-field-name">{}</div><div class="chatlog__embed-field-value">{}</div></div>"#,
            multiline(name),
            multiline(value)
        ));
        out.push('\n');
    }
    if let Some(footer) = &embed.footer {
        out.push_str(&format!(
            r#"<div class="chatlog__embed-footer">{}</div>"#,
            multiline(footer)
        ));
        out.push('\n');
    }
    out.push_str("</div>\n");
}

fn multiline(text: &str) -> String {
    escape(text).replace('\n', "<br>")
}

fn render_message(out: &mut String, message: &TranscriptMessage) {
    out.push_str(&format!(
        r#"<div class="chatlog__message" data-message-id="{}">"#,
        message.id
    ));
    out.push('\n');
    if let Some(avatar) = &message.avatar_url {
        out.push_str(&format!(
            r#"<img class="chatlog__avatar" src="{}" alt="">"#,
            escape(avatar)
        ));
        out.push('\n');
    }
    out.push_str("<div class=\"chatlog__body\">\n");
    out.push_str(&format!(
        r#"<span class="chatlog__author" data-user-id="{}">{}</span><span class="chatlog__timestamp">{}</span>"#,
        message.author_id,
        escape(&message.author_name),
        message.timestamp.format("%d/%m/%Y %H:%M:%S")
    ));
    out.push('\n');
    if !message.content.is_empty() {
        let content = multiline(&message.content);
        out.push_str(&format!(r#"<div class="chatlog__content">{content}</div>"#));
        out.push('\n');
    }
    for embed in &message.embeds {
        render_embed(out, embed);
    }
    if !message.attachments.is_empty() {
        out.push_str(ATTACHMENTS_OPEN);
        out.push('\n');
        for attachment in &message.attachments {
            out.push_str(&attachment_link(attachment));
            out.push('\n');
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n");
    out.push_str(&message_end_marker(message.id));
    out.push_str("</div>\n");
}

/// Render channel history as a standalone HTML page.
pub fn render(header: &TranscriptHeader, messages: &[TranscriptMessage]) -> String {
    let title = format!("Transcript - #{}", header.channel_name);
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape(&title)));
    out.push_str(&format!("<style>{STYLESHEET}</style>\n"));
    out.push_str("</head>\n<body>\n");
    out.push_str(&format!(
        "<div class=\"preamble\">\n<div class=\"preamble__title\">{}</div>\n<div class=\"preamble__entry\">#{} ({})</div>\n</div>\n",
        escape(&header.guild_name),
        escape(&header.channel_name),
        header.channel_id
    ));
    out.push_str("<div class=\"chatlog\">\n");
    for message in messages {
        render_message(&mut out, message);
    }
    out.push_str("</div>\n");
    out.push_str(&format!(
        "<div class=\"postamble\">{} message(s) exported on {}</div>\n",
        messages.len(),
        header.generated_at.format("%d/%m/%Y %H:%M:%S UTC")
    ));
    out.push_str("</body>\n</html>\n");
    out
}

/// Build the element that embeds an attachment's bytes.
///
/// A malformed content type is embedded as `application/octet-stream`.
pub fn embedded_tag(attachment: &InlineAttachment) -> String {
    let content_type =
        mime_essence(&attachment.content_type).unwrap_or_else(|| OCTET_STREAM.to_string());
    let data_uri = escape(&format!(
        "data:{};base64,{}",
        content_type,
        BASE64.encode(&attachment.bytes)
    ));
    let filename = escape(&attachment.filename);
    match AttachmentKind::from_content_type(&content_type) {
        AttachmentKind::Image => format!(
            r#"<img src="{data_uri}" alt="{filename}" style="{MEDIA_STYLE}">"#
        ),
        AttachmentKind::Video => format!(
            r#"<video controls style="{MEDIA_STYLE}"><source src="{data_uri}" type="{content_type}"></video>"#
        ),
        AttachmentKind::File => format!(
            r#"<a href="{data_uri}" download="{filename}" style="{FILE_STYLE}">📂 {filename} (Download)</a>"#
        ),
    }
}

/// Byte range `[start, end)` of a rendered message block, if present.
fn message_block(html: &str, id: Id) -> Option<(usize, usize)> {
    let open = format!(r#"data-message-id="{id}""#);
    let start = html.find(&open)?;
    let marker = message_end_marker(id);
    let end = start + html[start..].find(&marker)?;
    Some((start, end))
}

fn inline_one(html: &mut String, attachment: &InlineAttachment) -> bool {
    let Some((start, end)) = message_block(html, attachment.message_id) else {
        return false;
    };
    let tag = embedded_tag(attachment);

    // Replace the link that was rendered for this attachment
    let link_prefix = format!(
        r#"<a class="chatlog__attachment" href="{}">"#,
        escape(&attachment.url)
    );
    if let Some(rel) = html[start..end].find(&link_prefix) {
        let link_start = start + rel;
        if let Some(close) = html[link_start..end].find("</a>") {
            html.replace_range(link_start..link_start + close + "</a>".len(), &tag);
            return true;
        }
    }

    // No link: append to the attachments container, creating it if needed
    if let Some(rel) = html[start..end].find(ATTACHMENTS_OPEN) {
        let at = start + rel + ATTACHMENTS_OPEN.len();
        html.insert_str(at, &format!("\n{tag}"));
    } else {
        html.insert_str(end, &format!("{ATTACHMENTS_OPEN}\n{tag}\n</div>\n"));
    }
    true
}

/// Rewrite a rendered transcript so each attachment is embedded as data.
///
/// Attachments whose message is not in the transcript are skipped; the
/// number actually embedded is logged at debug level.
pub fn inline_attachments(html: &str, attachments: &[InlineAttachment]) -> String {
    let mut out = html.to_string();
    let mut embedded = 0usize;
    for attachment in attachments {
        if inline_one(&mut out, attachment) {
            embedded += 1;
        } else {
            tracing::debug!(
                message_id = %attachment.message_id,
                filename = %attachment.filename,
                "attachment message not found in transcript"
            );
        }
    }
    tracing::debug!(embedded, total = attachments.len(), "inlined transcript attachments");
    out
}

#[cfg(test)]
#[path = "transcript_tests.rs"]
mod tests;
