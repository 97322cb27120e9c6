//! Automation requests and their typed payloads.
//!
//! Every command the server dispatches to the extension is one of a finite
//! set of action kinds. Payloads are an internally tagged union keyed by the
//! action kind, so payload-shape comparison in the matching engine operates
//! on a known set of schemas instead of arbitrary JSON objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::context::ExecutionContext;

/// The supported automation action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Type text into an input or contenteditable element.
    FillText,
    /// Click an element.
    ClickElement,
    /// Select a named project in the site's project picker.
    SelectProject,
    /// Submit the form or composer the target element belongs to.
    SubmitForm,
    /// Read text content out of an element.
    ExtractText,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::FillText => write!(f, "fill_text"),
            MessageType::ClickElement => write!(f, "click_element"),
            MessageType::SelectProject => write!(f, "select_project"),
            MessageType::SubmitForm => write!(f, "submit_form"),
            MessageType::ExtractText => write!(f, "extract_text"),
        }
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fill_text" => Ok(MessageType::FillText),
            "click_element" => Ok(MessageType::ClickElement),
            "select_project" => Ok(MessageType::SelectProject),
            "submit_form" => Ok(MessageType::SubmitForm),
            "extract_text" => Ok(MessageType::ExtractText),
            other => Err(format!("invalid message type: '{other}'")),
        }
    }
}

/// Action-specific parameters, tagged by action kind.
///
/// One variant per [`MessageType`]. Optional fields are omitted from the
/// serialized form when absent, which is what makes key-set comparison
/// meaningful: two `FillText` payloads can still differ in shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionPayload {
    FillText {
        /// The text to enter.
        value: String,
        /// Clear the field before typing.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        clear_first: Option<bool>,
        /// Press Enter after typing (e.g. search boxes).
        #[serde(default, skip_serializing_if = "Option::is_none")]
        press_enter: Option<bool>,
    },
    ClickElement {
        /// Human-readable label of the intended target, for logging and the
        /// selection UI prompt. Not used for locating the element.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    SelectProject {
        /// Visible name of the project to select.
        project_name: String,
    },
    SubmitForm {
        /// Wait for navigation/response to settle before reporting success.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wait_for_response: Option<bool>,
    },
    ExtractText {
        /// Read this attribute instead of the text content.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },
}

impl ActionPayload {
    /// The action kind this payload belongs to.
    pub fn message_type(&self) -> MessageType {
        match self {
            ActionPayload::FillText { .. } => MessageType::FillText,
            ActionPayload::ClickElement { .. } => MessageType::ClickElement,
            ActionPayload::SelectProject { .. } => MessageType::SelectProject,
            ActionPayload::SubmitForm { .. } => MessageType::SubmitForm,
            ActionPayload::ExtractText { .. } => MessageType::ExtractText,
        }
    }

    /// Names of the parameters actually populated in this payload.
    ///
    /// Drives payload-shape similarity scoring: optional fields only count
    /// when present, so `FillText{value}` and `FillText{value, press_enter}`
    /// have overlapping but unequal key sets.
    pub fn keys(&self) -> Vec<&'static str> {
        match self {
            ActionPayload::FillText {
                clear_first,
                press_enter,
                ..
            } => {
                let mut keys = vec!["value"];
                if clear_first.is_some() {
                    keys.push("clear_first");
                }
                if press_enter.is_some() {
                    keys.push("press_enter");
                }
                keys
            }
            ActionPayload::ClickElement { description } => {
                let mut keys = Vec::new();
                if description.is_some() {
                    keys.push("description");
                }
                keys
            }
            ActionPayload::SelectProject { .. } => vec!["project_name"],
            ActionPayload::SubmitForm { wait_for_response } => {
                let mut keys = Vec::new();
                if wait_for_response.is_some() {
                    keys.push("wait_for_response");
                }
                keys
            }
            ActionPayload::ExtractText { attribute } => {
                let mut keys = Vec::new();
                if attribute.is_some() {
                    keys.push("attribute");
                }
                keys
            }
        }
    }
}

/// One incoming automation command, already fingerprinted.
///
/// The action kind is carried by the payload variant, so a request can never
/// disagree with its own parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationRequest {
    /// Action parameters (variant determines the message type).
    pub payload: ActionPayload,
    /// The page context this request targets.
    pub context: ExecutionContext,
}

impl AutomationRequest {
    pub fn new(payload: ActionPayload, context: ExecutionContext) -> Self {
        Self { payload, context }
    }

    /// The action kind of this request.
    pub fn message_type(&self) -> MessageType {
        self.payload.message_type()
    }
}

/// The bus-delivered shape: an automation request plus the correlation id
/// the transport layer tracks replies by. Every outcome the engine reports
/// echoes this id back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Correlation id assigned by the transport layer.
    pub correlation_id: Uuid,
    /// The request itself.
    pub request: AutomationRequest,
    /// When the engine accepted the command.
    pub received_at: DateTime<Utc>,
}

impl CommandEnvelope {
    pub fn new(correlation_id: Uuid, request: AutomationRequest) -> Self {
        Self {
            correlation_id,
            request,
            received_at: Utc::now(),
        }
    }
}
