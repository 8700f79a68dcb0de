use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::api::{ApiClient, ApiError, FilePart};
use crate::models::MabarSession;
use crate::services::mabar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionStats {
    pub approved: u32,
    pub pending: u32,
    pub rejected: u32,
    pub revenue: i64,
    pub fill_rate: u32,
    pub remaining: u32,
}

impl SessionStats {
    pub fn of(session: &MabarSession) -> Self {
        let count = |pred: fn(&crate::models::ParticipantStatus) -> bool| {
            session.participants.iter().filter(|p| pred(&p.status)).count() as u32
        };
        let approved = session.approved_count();
        let fill_rate = if session.slots_total == 0 {
            0
        } else {
            (approved as f64 / session.slots_total as f64 * 100.0).round() as u32
        };

        Self {
            approved,
            pending: count(|s| s.is_pending()),
            rejected: count(|s| s.is_terminal()),
            revenue: approved as i64 * session.price_per_slot,
            fill_rate,
            remaining: session.available_slots(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoverEdit {
    Keep,
    Replace { file: FilePart, preview: String },
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionForm {
    pub title: String,
    pub description: String,
    pub slots_total: u32,
    pub price_per_slot: i64,
    pub payment_instructions: String,
    pub cover: CoverEdit,
}

impl From<&MabarSession> for SessionForm {
    fn from(s: &MabarSession) -> Self {
        Self {
            title: s.title.clone(),
            description: s.description.clone().unwrap_or_default(),
            slots_total: s.slots_total,
            price_per_slot: s.price_per_slot,
            payment_instructions: s.payment_instructions.clone().unwrap_or_default(),
            cover: CoverEdit::Keep,
        }
    }
}

impl SessionForm {
    fn to_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("title".to_string(), self.title.trim().to_string()),
            ("description".to_string(), self.description.clone()),
            ("slots_total".to_string(), self.slots_total.to_string()),
            ("price_per_slot".to_string(), self.price_per_slot.to_string()),
            (
                "payment_instructions".to_string(),
                self.payment_instructions.clone(),
            ),
        ];
        if self.cover == CoverEdit::Remove {
            fields.push(("remove_cover".to_string(), "1".to_string()));
        }
        fields
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("not in edit mode")]
    NotEditing,

    #[error("Judul sesi wajib diisi.")]
    EmptyTitle,

    #[error("Jumlah slot harus lebih dari 0.")]
    NoSlots,

    #[error("Jumlah slot tidak boleh kurang dari {approved} peserta yang sudah disetujui.")]
    SlotsBelowApproved { slots: u32, approved: u32 },

    #[error("Harga per slot tidak boleh negatif.")]
    NegativePrice,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Host-side store for one session: the last loaded snapshot plus an edit form.
#[derive(Debug, Clone)]
pub struct SessionEditor {
    snapshot: MabarSession,
    form: SessionForm,
    editing: bool,
}

impl SessionEditor {
    pub fn new(snapshot: MabarSession) -> Self {
        let form = SessionForm::from(&snapshot);
        Self {
            snapshot,
            form,
            editing: false,
        }
    }

    pub fn snapshot(&self) -> &MabarSession {
        &self.snapshot
    }

    pub fn form(&self) -> &SessionForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SessionForm {
        &mut self.form
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats::of(&self.snapshot)
    }

    pub fn enter_edit(&mut self) {
        self.form = SessionForm::from(&self.snapshot);
        self.editing = true;
    }

    pub fn cancel(&mut self) {
        self.form = SessionForm::from(&self.snapshot);
        self.editing = false;
    }

    /// Last load wins. An open form is left alone.
    pub fn reload(&mut self, session: MabarSession) {
        self.snapshot = session;
        if !self.editing {
            self.form = SessionForm::from(&self.snapshot);
        }
    }

    pub fn replace_cover(&mut self, file: FilePart) {
        let preview = format!(
            "data:{};base64,{}",
            file.content_type,
            STANDARD.encode(&file.bytes)
        );
        self.form.cover = CoverEdit::Replace { file, preview };
    }

    pub fn remove_cover(&mut self) {
        self.form.cover = CoverEdit::Remove;
    }

    /// Image the form currently shows: new preview, existing cover, or none.
    pub fn cover_preview(&self) -> Option<&str> {
        match &self.form.cover {
            CoverEdit::Keep => self.snapshot.cover_image.as_deref(),
            CoverEdit::Replace { preview, .. } => Some(preview),
            CoverEdit::Remove => None,
        }
    }

    pub fn validate(&self) -> Result<(), EditError> {
        let form = &self.form;
        if form.title.trim().is_empty() {
            return Err(EditError::EmptyTitle);
        }
        if form.slots_total == 0 {
            return Err(EditError::NoSlots);
        }
        let approved = self.snapshot.approved_count();
        if form.slots_total < approved {
            return Err(EditError::SlotsBelowApproved {
                slots: form.slots_total,
                approved,
            });
        }
        if form.price_per_slot < 0 {
            return Err(EditError::NegativePrice);
        }
        Ok(())
    }

    pub async fn save(&mut self, api: &ApiClient) -> Result<&MabarSession, EditError> {
        if !self.editing {
            return Err(EditError::NotEditing);
        }
        self.validate()?;

        let cover = match &self.form.cover {
            CoverEdit::Replace { file, .. } => Some(file.clone()),
            _ => None,
        };
        let updated = mabar::update(api, self.snapshot.id, self.form.to_fields(), cover).await?;
        tracing::info!(session_id = updated.id, "mabar session updated");

        self.snapshot = updated;
        self.form = SessionForm::from(&self.snapshot);
        self.editing = false;
        Ok(&self.snapshot)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::testing::MockTransport;
    use crate::api::{Method, RequestBody};
    use crate::models::mabar::fixtures::session;
    use crate::models::ParticipantStatus::*;

    fn approved(n: usize) -> Vec<crate::models::ParticipantStatus> {
        vec![Approved; n]
    }

    #[test]
    fn test_fill_rate_values() {
        assert_eq!(SessionStats::of(&session(10, &approved(3))).fill_rate, 30);
        assert_eq!(SessionStats::of(&session(10, &[])).fill_rate, 0);
        assert_eq!(SessionStats::of(&session(4, &approved(4))).fill_rate, 100);
        assert_eq!(SessionStats::of(&session(3, &approved(2))).fill_rate, 67);
        assert_eq!(SessionStats::of(&session(0, &[])).fill_rate, 0);
    }

    #[test]
    fn test_stats_counts_and_revenue() {
        let s = session(6, &[Approved, Approved, Pending, WaitingPayment, Rejected]);
        let stats = SessionStats::of(&s);
        assert_eq!(stats.approved, 2);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.revenue, 50_000);
        assert_eq!(stats.remaining, 4);
    }

    #[test]
    fn test_cancel_restores_snapshot() {
        let mut editor = SessionEditor::new(session(5, &[]));
        editor.enter_edit();
        editor.form_mut().title = "Changed".to_string();
        editor.form_mut().slots_total = 9;
        editor.remove_cover();

        editor.cancel();
        assert!(!editor.is_editing());
        assert_eq!(editor.form(), &SessionForm::from(editor.snapshot()));
    }

    #[test]
    fn test_reload_replaces_snapshot() {
        let mut editor = SessionEditor::new(session(5, &[]));
        let mut newer = session(5, &[Approved]);
        newer.title = "Reloaded".to_string();

        editor.reload(newer);
        assert_eq!(editor.snapshot().title, "Reloaded");
        assert_eq!(editor.form().title, "Reloaded");
        assert_eq!(editor.stats().approved, 1);
    }

    #[test]
    fn test_cover_preview() {
        let mut editor = SessionEditor::new(session(5, &[]));
        editor.enter_edit();
        editor.replace_cover(FilePart {
            field: "cover_image".to_string(),
            file_name: "c.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        });
        assert_eq!(editor.cover_preview(), Some("data:image/png;base64,AQID"));

        editor.remove_cover();
        assert_eq!(editor.cover_preview(), None);
    }

    #[test]
    fn test_validation() {
        let mut editor = SessionEditor::new(session(5, &approved(3)));
        editor.enter_edit();

        editor.form_mut().slots_total = 2;
        assert!(matches!(
            editor.validate(),
            Err(EditError::SlotsBelowApproved { slots: 2, approved: 3 })
        ));

        editor.form_mut().slots_total = 0;
        assert!(matches!(editor.validate(), Err(EditError::NoSlots)));

        editor.form_mut().slots_total = 3;
        editor.form_mut().title = "   ".to_string();
        assert!(matches!(editor.validate(), Err(EditError::EmptyTitle)));
    }

    #[tokio::test]
    async fn test_save_sends_multipart_and_replaces_snapshot() {
        let mock = Arc::new(MockTransport::new());
        let mut saved = serde_json::to_value(session(8, &[])).unwrap();
        saved["title"] = json!("Mabar Futsal Malam");
        mock.respond(Method::Post, "/mabar/1", 200, json!({ "data": saved }));
        let api = ApiClient::new(mock.clone());

        let mut editor = SessionEditor::new(session(5, &[]));
        editor.enter_edit();
        editor.form_mut().title = "Mabar Futsal Malam".to_string();
        editor.form_mut().slots_total = 8;
        editor.save(&api).await.unwrap();

        assert!(!editor.is_editing());
        assert_eq!(editor.snapshot().title, "Mabar Futsal Malam");
        assert_eq!(editor.snapshot().slots_total, 8);

        let sent = mock.requests();
        match &sent[0].body {
            RequestBody::Multipart { fields, files } => {
                assert!(fields.contains(&("_method".to_string(), "PUT".to_string())));
                assert!(fields.contains(&("slots_total".to_string(), "8".to_string())));
                assert!(files.is_empty());
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_save_sends_nothing() {
        let mock = Arc::new(MockTransport::new());
        let api = ApiClient::new(mock.clone());
        let mut editor = SessionEditor::new(session(5, &[]));
        editor.enter_edit();
        editor.form_mut().title.clear();

        assert!(editor.save(&api).await.is_err());
        assert!(mock.requests().is_empty());
    }
}
