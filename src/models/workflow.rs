use crate::models::{admin_actions, ListingData, ModerationStatus, PostData};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("Ação '{action}' não é permitida a partir do estado '{from}'")]
    IllegalTransition { from: String, action: &'static str },
    #[error("{0}")]
    MissingInput(&'static str),
    #[error("Ação desconhecida: '{0}'")]
    UnknownAction(String),
    #[error("Envie apenas uma mudança de estado por requisição")]
    ConflictingActions,
}

/// Moderation actions an administrator can take on a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingAction {
    Approve,
    Reject { reason: String },
    Block { reason: String },
    Unblock,
    ToggleFeatured,
}

impl ListingAction {
    pub fn name(&self) -> &'static str {
        match self {
            ListingAction::Approve => "aprovar",
            ListingAction::Reject { .. } => "rejeitar",
            ListingAction::Block { .. } => "bloquear",
            ListingAction::Unblock => "desbloquear",
            ListingAction::ToggleFeatured => "destacar",
        }
    }

    pub fn log_code(&self) -> &'static str {
        match self {
            ListingAction::Approve => admin_actions::APPROVE_LISTING,
            ListingAction::Reject { .. } => admin_actions::REJECT_LISTING,
            ListingAction::Block { .. } => admin_actions::BLOCK_LISTING,
            ListingAction::Unblock => admin_actions::UNBLOCK_LISTING,
            ListingAction::ToggleFeatured => admin_actions::FEATURE_LISTING,
        }
    }

    /// Builds a block action, refusing blank reasons.
    pub fn block(reason: Option<&str>) -> Result<Self, WorkflowError> {
        required_text(reason, "Informe o motivo do bloqueio")
            .map(|reason| ListingAction::Block { reason })
    }

    pub fn reject(reason: Option<&str>) -> Result<Self, WorkflowError> {
        required_text(reason, "Informe o motivo da rejeição")
            .map(|reason| ListingAction::Reject { reason })
    }
}

/// Moderation actions on a community post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostAction {
    Approve { admin_id: String },
    Reject { reason: String },
}

impl PostAction {
    pub fn approve(admin_id: Option<&str>) -> Result<Self, WorkflowError> {
        required_text(admin_id, "Informe o administrador responsável pela aprovação")
            .map(|admin_id| PostAction::Approve { admin_id })
    }

    pub fn reject(reason: Option<&str>) -> Result<Self, WorkflowError> {
        required_text(reason, "Informe o motivo da rejeição")
            .map(|reason| PostAction::Reject { reason })
    }

    pub fn name(&self) -> &'static str {
        match self {
            PostAction::Approve { .. } => "aprovar",
            PostAction::Reject { .. } => "rejeitar",
        }
    }

    pub fn log_code(&self) -> &'static str {
        match self {
            PostAction::Approve { .. } => admin_actions::APPROVE_POST,
            PostAction::Reject { .. } => admin_actions::REJECT_POST,
        }
    }
}

fn required_text(value: Option<&str>, message: &'static str) -> Result<String, WorkflowError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(WorkflowError::MissingInput(message)),
    }
}

fn listing_state(listing: &ListingData) -> String {
    let active = if listing.active { "ativa" } else { "inativa" };
    format!("{}/{}", listing.status, active)
}

/// Validates `action` against the listing's current (status, active) pair and
/// applies it in place. Nothing is mutated when the transition is refused.
pub fn apply_listing_action(
    listing: &mut ListingData,
    action: &ListingAction,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    let illegal = |listing: &ListingData| WorkflowError::IllegalTransition {
        from: listing_state(listing),
        action: action.name(),
    };

    match action {
        ListingAction::Approve => {
            if listing.is_publicly_visible() {
                return Err(illegal(listing));
            }
            listing.status = ModerationStatus::Approved;
            listing.active = true;
            listing.block_reason = None;
            listing.rejection_reason = None;
        }
        ListingAction::Reject { reason } => {
            if listing.status != ModerationStatus::Pending {
                return Err(illegal(listing));
            }
            listing.status = ModerationStatus::Rejected;
            listing.active = false;
            listing.rejection_reason = Some(reason.clone());
        }
        ListingAction::Block { reason } => {
            if !listing.is_publicly_visible() {
                return Err(illegal(listing));
            }
            listing.active = false;
            listing.block_reason = Some(reason.clone());
        }
        ListingAction::Unblock => {
            if !listing.is_blocked() {
                return Err(illegal(listing));
            }
            listing.active = true;
            listing.block_reason = None;
        }
        ListingAction::ToggleFeatured => {
            listing.featured = !listing.featured;
        }
    }

    listing.updated_at = now;
    Ok(())
}

/// Applies a moderation decision to a pending post.
pub fn apply_post_action(
    post: &mut PostData,
    action: &PostAction,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    if post.status != ModerationStatus::Pending {
        return Err(WorkflowError::IllegalTransition {
            from: post.status.to_string(),
            action: action.name(),
        });
    }

    match action {
        PostAction::Approve { admin_id } => {
            post.status = ModerationStatus::Approved;
            post.approved_at = Some(now);
            post.approved_by = Some(admin_id.clone());
            post.rejection_reason = None;
        }
        PostAction::Reject { reason } => {
            post.status = ModerationStatus::Rejected;
            post.approved_at = None;
            post.approved_by = None;
            post.rejection_reason = Some(reason.clone());
        }
    }
    Ok(())
}
