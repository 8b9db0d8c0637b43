//! Live payload updates.
//!
//! An update is synchronous and non-reentrant per message (`&mut self`
//! enforces it): the incoming frame either replaces the whole payload or
//! touches nothing. Mismatched frames are a silent no-op so a tight polling
//! loop can feed every received frame without filtering first.

use serde_derive::{Deserialize, Serialize};

use crate::types::canframe::CanFrame;
use crate::types::database::{DatabaseDBC, MessageKey, SignalKey};

/// Outcome of one successful payload update: the canonical id of the
/// affected message and the names of the signals whose decoded value
/// changed (possibly empty).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageUpdate {
    pub id_hex: String,
    pub modified_signals: Vec<String>,
}

impl DatabaseDBC {
    /// Applies a received frame to one message.
    ///
    /// Returns `None`, leaving payload and signal values untouched, when
    /// the frame id does not match the message id or the frame length does
    /// not match the declared byte length. Otherwise the payload is
    /// overwritten, every signal's new decoded value is committed, and the
    /// names of the changed signals are reported.
    pub fn update_message(&mut self, key: MessageKey, frame: &CanFrame) -> Option<MessageUpdate> {
        let (id_hex, sig_keys) = {
            let msg = self.messages.get(key)?;
            if frame.id != msg.id || frame.data.len() != msg.byte_length as usize {
                return None;
            }
            (msg.id_hex.clone(), msg.signals.clone())
        };

        // Snapshot the pre-update decoded values before the payload moves.
        let pre: Vec<(SignalKey, u64)> = sig_keys
            .iter()
            .map(|&sk| (sk, self.signal_value(sk).unwrap_or_default()))
            .collect();

        if let Some(msg) = self.messages.get_mut(key) {
            msg.payload.copy_from_slice(&frame.data);
        }

        let mut modified_signals: Vec<String> = Vec::new();
        for (sk, old) in pre {
            let new: u64 = self.signal_value(sk).unwrap_or_default();
            if new != old
                && let Some(sig) = self.signals.get(sk)
            {
                modified_signals.push(sig.name.clone());
            }
            if let Some(sig) = self.signals.get_mut(sk) {
                sig.value = new;
            }
        }

        Some(MessageUpdate {
            id_hex,
            modified_signals,
        })
    }

    /// Like [`update_message`](Self::update_message), invoking `listener`
    /// exactly once, on the caller's thread and unbuffered, when the update
    /// applies. Returns whether it did.
    pub fn update_message_with<F>(&mut self, key: MessageKey, frame: &CanFrame, mut listener: F) -> bool
    where
        F: FnMut(&MessageUpdate),
    {
        match self.update_message(key, frame) {
            Some(update) => {
                listener(&update);
                true
            }
            None => false,
        }
    }

    /// Resolves the target message by the frame's numeric id, then applies
    /// the frame. `None` when no message carries that id.
    pub fn update_from_frame(&mut self, frame: &CanFrame) -> Option<MessageUpdate> {
        let key: MessageKey = self.get_msg_key_by_id(frame.id)?;
        self.update_message(key, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    const TWO_SIGNALS: &str = r#"
BU_: Motor

BO_ 100 Motor_01: 2 Motor
 SG_ Speed : 0|8@1+ (1,0) [0|255] "km/h" Gateway
 SG_ Temp : 8|8@1+ (1,0) [0|255] "degC" Gateway
"#;

    #[test]
    fn test_update_reports_only_changed_signals() {
        let mut db = parse::from_text(TWO_SIGNALS).unwrap();
        let key = db.get_msg_key_by_id_hex("0x064").unwrap();

        let first = db
            .update_message(key, &CanFrame::new(100, vec![0x11, 0x22]))
            .unwrap();
        assert_eq!(first.id_hex, "0x064");
        assert_eq!(first.modified_signals, ["Speed", "Temp"]);

        // Only the first byte changes: exactly one signal must be reported.
        let second = db
            .update_message(key, &CanFrame::new(100, vec![0x33, 0x22]))
            .unwrap();
        assert_eq!(second.modified_signals, ["Speed"]);

        let speed = db.get_signal_in_message("0x064", "Speed").unwrap();
        let temp = db.get_signal_in_message("0x064", "Temp").unwrap();
        assert_eq!(speed.value, 0x33);
        assert_eq!(temp.value, 0x22);

        // Identical frame: applied, nothing modified.
        let third = db
            .update_message(key, &CanFrame::new(100, vec![0x33, 0x22]))
            .unwrap();
        assert!(third.modified_signals.is_empty());
    }

    #[test]
    fn test_mismatch_is_a_silent_no_op() {
        let mut db = parse::from_text(TWO_SIGNALS).unwrap();
        let key = db.get_msg_key_by_id_hex("0x064").unwrap();
        db.update_message(key, &CanFrame::new(100, vec![0x11, 0x22]))
            .unwrap();

        // wrong length
        assert!(db.update_message(key, &CanFrame::new(100, vec![0xFF])).is_none());
        // wrong id
        assert!(
            db.update_message(key, &CanFrame::new(101, vec![0xFF, 0xFF]))
                .is_none()
        );

        let msg = db.get_message_by_id_hex("0x064").unwrap();
        assert_eq!(msg.payload, vec![0x11, 0x22]);
        assert_eq!(
            db.get_signal_in_message("0x064", "Speed").unwrap().value,
            0x11
        );
        assert_eq!(
            db.get_signal_in_message("0x064", "Temp").unwrap().value,
            0x22
        );
    }

    #[test]
    fn test_listener_fires_once_per_applied_update() {
        let mut db = parse::from_text(TWO_SIGNALS).unwrap();
        let key = db.get_msg_key_by_id_hex("0x064").unwrap();

        let mut seen: Vec<MessageUpdate> = Vec::new();
        let applied = db.update_message_with(key, &CanFrame::new(100, vec![0x01, 0x00]), |u| {
            seen.push(u.clone());
        });
        assert!(applied);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].modified_signals, ["Speed"]);

        let rejected = db.update_message_with(key, &CanFrame::new(0, vec![]), |u| {
            seen.push(u.clone());
        });
        assert!(!rejected);
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn test_update_from_frame_resolves_by_id() {
        let mut db = parse::from_text(TWO_SIGNALS).unwrap();
        assert!(db.update_from_frame(&CanFrame::new(999, vec![0, 0])).is_none());
        let update = db
            .update_from_frame(&CanFrame::new(100, vec![0x10, 0x00]))
            .unwrap();
        assert_eq!(update.modified_signals, ["Speed"]);
    }
}
