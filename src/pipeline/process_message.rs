//! Message processor: rewrites headers so SES accepts the forward.
//!
//! SES only sends from verified identities, so `From` is rewritten to the
//! matched recipient and the real sender moves to `Reply-To`. `Return-Path`
//! and any SES-issued `DKIM-Signature` are dropped; SES rejects a message
//! that already carries its own signature.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::{Captures, Regex};
use tracing::{debug, error};

use crate::pipeline::types::{PipelineContext, Step, StepOutcome};

pub const MISSING_MESSAGE: &str = "Error: No message to process.";

/// Marks a signature added by SES itself.
pub const SES_DKIM_DOMAIN: &str = "d=amazonses.com;";

/// Header block = every non-empty line before the first blank line.
static MESSAGE_PARTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^((?:[^\r\n]+\r?\n)*)(\r?\n(?s:.*))$").unwrap());

static REPLY_TO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^Reply-To:[^\n]*(?:\n|\z)(?:[ \t][^\n]*(?:\n|\z))*").unwrap()
});

static FROM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^From:[ \t]*([^\r\n]*(?:\r?\n[ \t]+[^\r\n]*)*)").unwrap()
});

static SUBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?mi)^Subject:[ \t]*").unwrap());

static RETURN_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^Return-Path:[^\n]*(?:\n|\z)(?:[ \t][^\n]*(?:\n|\z))*").unwrap()
});

static DKIM_SIGNATURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^DKIM-Signature:[^\n]*(?:\n|\z)(?:[ \t][^\n]*(?:\n|\z))*").unwrap()
});

/// Inputs of a header rewrite.
#[derive(Debug, Clone)]
pub struct HeaderRewrite<'a> {
    /// Address the forward is sent from.
    pub original_recipient: &'a str,
    /// Address of the real sender, used as `Reply-To`.
    pub reply_to: &'a str,
    pub subject_prefix: Option<&'a str>,
}

/// Split a raw message into header block and body.
///
/// The body starts at the blank separator line. A message with no blank
/// line is all header.
pub fn split_message(raw: &str) -> (&str, &str) {
    match MESSAGE_PARTS.captures(raw) {
        Some(caps) => {
            let header = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());
            (header, body)
        }
        None => (raw, ""),
    }
}

/// Rewrite the headers of `raw` for forwarding. The body is never touched.
pub fn rewrite_message(raw: &str, rewrite: &HeaderRewrite<'_>) -> String {
    let (header, body) = split_message(raw);
    let eol = if header.contains("\r\n") { "\r\n" } else { "\n" };

    let header = REPLY_TO.replace_all(header, "");

    let header = FROM.replace_all(&header, |caps: &Captures<'_>| {
        let display = unfold(&caps[1]).replace('<', "at ").replace('>', "");
        format!(
            "From: {} <{}>{eol}Reply-To: {}",
            display.trim(),
            rewrite.original_recipient,
            rewrite.reply_to
        )
    });

    let header = match rewrite.subject_prefix {
        Some(prefix) => SUBJECT
            .replace_all(&header, |_: &Captures<'_>| format!("Subject: {prefix}"))
            .into_owned(),
        None => header.into_owned(),
    };

    let header = RETURN_PATH.replace_all(&header, "");

    let header = DKIM_SIGNATURE.replace_all(&header, |caps: &Captures<'_>| {
        if caps[0].contains(SES_DKIM_DOMAIN) {
            String::new()
        } else {
            caps[0].to_string()
        }
    });

    format!("{header}{body}")
}

/// Join folded header continuation lines.
fn unfold(value: &str) -> String {
    value.replace("\r\n", "").replace('\n', "")
}

pub struct ProcessMessage;

#[async_trait]
impl Step for ProcessMessage {
    fn name(&self) -> &str {
        "process_message"
    }

    async fn run(&self, ctx: &mut PipelineContext) -> StepOutcome {
        let (Some(raw), Some(mail), Some(original_recipient)) = (
            ctx.email_data.as_deref(),
            ctx.mail.as_ref(),
            ctx.original_recipient.as_deref(),
        ) else {
            error!("process_message ran without a fetched message and matched recipient");
            return StepOutcome::fail(MISSING_MESSAGE);
        };

        let rewrite = HeaderRewrite {
            original_recipient,
            reply_to: &mail.source,
            subject_prefix: ctx.config.subject_prefix.as_deref(),
        };
        let processed = rewrite_message(raw, &rewrite);

        debug!(
            original_len = raw.len(),
            processed_len = processed.len(),
            "Rewrote message headers"
        );
        ctx.email_data = Some(processed);
        StepOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite() -> HeaderRewrite<'static> {
        HeaderRewrite {
            original_recipient: "info@example.com",
            reply_to: "p@y.com",
            subject_prefix: None,
        }
    }

    // ── split_message ───────────────────────────────────────────────

    #[test]
    fn split_at_first_blank_line() {
        let raw = "From: a@b.com\r\nTo: c@d.com\r\n\r\nBody\r\n\r\nMore";
        let (header, body) = split_message(raw);
        assert_eq!(header, "From: a@b.com\r\nTo: c@d.com\r\n");
        assert_eq!(body, "\r\nBody\r\n\r\nMore");
    }

    #[test]
    fn split_without_blank_line_is_all_header() {
        let raw = "From: a@b.com\r\nSubject: hi";
        assert_eq!(split_message(raw), (raw, ""));
    }

    #[test]
    fn split_bare_newlines() {
        let (header, body) = split_message("Subject: x\n\nHello\n");
        assert_eq!(header, "Subject: x\n");
        assert_eq!(body, "\nHello\n");
    }

    // ── rewrite_message ─────────────────────────────────────────────

    #[test]
    fn rewrites_from_and_adds_reply_to() {
        let raw = "From: Person <p@y.com>\r\nTo: info@example.com\r\n\r\nBody";
        let out = rewrite_message(raw, &rewrite());
        assert_eq!(
            out,
            "From: Person at p@y.com <info@example.com>\r\nReply-To: p@y.com\r\nTo: info@example.com\r\n\r\nBody"
        );
    }

    #[test]
    fn bare_from_address_is_kept_as_display() {
        let raw = "From: p@y.com\nTo: info@example.com\n\nBody";
        let out = rewrite_message(raw, &rewrite());
        assert!(out.starts_with("From: p@y.com <info@example.com>\nReply-To: p@y.com\nTo:"));
    }

    #[test]
    fn folded_from_is_unfolded() {
        let raw = "From: \"A Very Long Name\"\r\n <p@y.com>\r\nTo: x@z.com\r\n\r\nBody";
        let out = rewrite_message(raw, &rewrite());
        assert!(out.starts_with(
            "From: \"A Very Long Name\" at p@y.com <info@example.com>\r\nReply-To: p@y.com\r\nTo: x@z.com\r\n"
        ));
    }

    #[test]
    fn removes_existing_reply_to() {
        let raw = "Reply-To: other@y.com\r\nFrom: p@y.com\r\n\r\nBody";
        let out = rewrite_message(raw, &rewrite());
        assert!(!out.contains("other@y.com"));
        assert_eq!(out.matches("Reply-To:").count(), 1);
    }

    #[test]
    fn removes_folded_reply_to_with_continuations() {
        let raw = "To: info@example.com\r\nReply-To: \"Long Name\"\r\n <old@y.com>\r\nFrom: p@y.com\r\n\r\nBody";
        let out = rewrite_message(raw, &rewrite());
        assert_eq!(
            out,
            "To: info@example.com\r\nFrom: p@y.com <info@example.com>\r\nReply-To: p@y.com\r\n\r\nBody"
        );
    }

    #[test]
    fn removes_folded_return_path() {
        let raw = "Return-Path:\r\n <bounce@y.com>\r\nFrom: p@y.com\r\n\r\nBody";
        let out = rewrite_message(raw, &rewrite());
        assert_eq!(
            out,
            "From: p@y.com <info@example.com>\r\nReply-To: p@y.com\r\n\r\nBody"
        );
    }

    #[test]
    fn removes_return_path() {
        let raw = "Return-Path: <bounce@y.com>\r\nFrom: p@y.com\r\n\r\nBody";
        let out = rewrite_message(raw, &rewrite());
        assert!(!out.contains("Return-Path"));
        assert!(!out.contains("bounce@y.com"));
    }

    #[test]
    fn removes_ses_dkim_signature_with_continuations() {
        let raw = "DKIM-Signature: v=1; a=rsa-sha256; q=dns/txt; c=relaxed/simple;\r\n\ts=224i4yxa5dv7c2xz3womw6peuasteono; d=amazonses.com; t=1;\r\n\th=From:To;\r\n\tb=abc\r\nFrom: p@y.com\r\n\r\nBody";
        let out = rewrite_message(raw, &rewrite());
        assert!(!out.contains("DKIM-Signature"));
        assert!(!out.contains("amazonses"));
        assert!(out.starts_with("From: p@y.com <info@example.com>\r\n"));
    }

    #[test]
    fn keeps_foreign_dkim_signature_verbatim() {
        let dkim = "DKIM-Signature: v=1; a=rsa-sha256; d=y.com; s=sel;\r\n\th=From:To;\r\n\tb=xyz\r\n";
        let raw = format!("{dkim}From: p@y.com\r\n\r\nBody");
        let out = rewrite_message(&raw, &rewrite());
        assert!(out.starts_with(dkim));
    }

    #[test]
    fn only_ses_signature_removed_when_both_present() {
        let ours = "DKIM-Signature: v=1; d=y.com; b=keep\r\n";
        let ses = "DKIM-Signature: v=1; d=amazonses.com; b=drop\r\n";
        let raw = format!("{ours}{ses}From: p@y.com\r\n\r\nBody");
        let out = rewrite_message(&raw, &rewrite());
        assert!(out.contains("b=keep"));
        assert!(!out.contains("b=drop"));
    }

    #[test]
    fn body_is_untouched() {
        let raw = "From: p@y.com\r\n\r\nFrom: not-a-header <x@y.com>\r\nReply-To: body@y.com\r\nReturn-Path: body";
        let out = rewrite_message(raw, &rewrite());
        assert!(out.ends_with(
            "\r\n\r\nFrom: not-a-header <x@y.com>\r\nReply-To: body@y.com\r\nReturn-Path: body"
        ));
    }

    #[test]
    fn message_without_matching_headers_is_unchanged() {
        let raw = "To: info@example.com\r\nSubject: hi\r\n\r\nBody";
        assert_eq!(rewrite_message(raw, &rewrite()), raw);
    }

    #[test]
    fn subject_prefix_applied() {
        let raw = "Subject: Hello\r\nFrom: p@y.com\r\n\r\nBody";
        let rewrite = HeaderRewrite {
            subject_prefix: Some("[fwd] "),
            ..rewrite()
        };
        let out = rewrite_message(raw, &rewrite);
        assert!(out.starts_with("Subject: [fwd] Hello\r\n"));
    }

    #[test]
    fn subject_prefix_with_dollar_is_literal() {
        let raw = "Subject: Hello\n\nBody";
        let rewrite = HeaderRewrite {
            subject_prefix: Some("$1 "),
            ..rewrite()
        };
        assert!(rewrite_message(raw, &rewrite).starts_with("Subject: $1 Hello\n"));
    }

    #[test]
    fn return_path_removal_is_stable() {
        let raw = "Return-Path: <b@y.com>\r\nTo: x@z.com\r\n\r\nBody";
        let once = rewrite_message(raw, &rewrite());
        let twice = rewrite_message(&once, &rewrite());
        assert_eq!(once, twice);
    }
}
