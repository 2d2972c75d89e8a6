//! Skin selection and per-slot partial overrides.

use hashbrown::HashMap;

use crate::data::{AttachmentData, SkeletonData};
use crate::error::RuntimeError;

/// Active skin plus `slot -> attachment name` overrides layered on top of it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkinResolver {
    current: Option<String>,
    partial: HashMap<usize, String>,
}

impl SkinResolver {
    pub fn new(initial: Option<String>) -> Self {
        Self {
            current: initial,
            partial: HashMap::new(),
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Switch skins wholesale. Partial overrides are dropped on success.
    pub fn change_skin_to(&mut self, data: &SkeletonData, name: &str) -> Result<(), RuntimeError> {
        if data.skin(name).is_none() {
            log::warn!("unknown skin '{name}'");
            return Err(RuntimeError::UnknownSkin {
                name: name.to_string(),
            });
        }
        log::debug!("skin -> '{name}' ({} partial overrides cleared)", self.partial.len());
        self.current = Some(name.to_string());
        self.partial.clear();
        Ok(())
    }

    /// Merge `slot name -> attachment name` overrides. Every entry is checked
    /// before any is applied.
    pub fn change_partial<I, S, A>(&mut self, data: &SkeletonData, overrides: I) -> Result<(), RuntimeError>
    where
        I: IntoIterator<Item = (S, A)>,
        S: AsRef<str>,
        A: AsRef<str>,
    {
        let mut staged = Vec::new();
        for (slot_name, attachment) in overrides {
            let (slot_name, attachment) = (slot_name.as_ref(), attachment.as_ref());
            let Some(slot) = data.slot_index(slot_name) else {
                log::warn!("partial skin names unknown slot '{slot_name}'");
                return Err(RuntimeError::UnknownSlot {
                    name: slot_name.to_string(),
                });
            };
            if self.partial_attachment(data, slot, attachment).is_none() {
                log::warn!("no skin defines '{attachment}' for slot '{slot_name}'");
                return Err(RuntimeError::UnknownAttachment {
                    slot: slot_name.to_string(),
                    attachment: attachment.to_string(),
                });
            }
            staged.push((slot, attachment.to_string()));
        }
        self.partial.extend(staged);
        Ok(())
    }

    pub fn reset_partial(&mut self) {
        self.partial.clear();
    }

    /// Attachment name forced onto `slot`, if any.
    pub fn partial(&self, slot: usize) -> Option<&str> {
        self.partial.get(&slot).map(String::as_str)
    }

    pub fn partial_len(&self) -> usize {
        self.partial.len()
    }

    /// Skin layer lookup: current skin, then the default skin.
    pub fn skin_attachment<'d>(
        &self,
        data: &'d SkeletonData,
        slot: usize,
        name: &str,
    ) -> Option<&'d AttachmentData> {
        self.current
            .as_deref()
            .and_then(|skin| data.skin(skin))
            .and_then(|skin| skin.attachment(slot, name))
            .or_else(|| {
                data.default_skin()
                    .and_then(|skin| skin.attachment(slot, name))
            })
    }

    /// Partial layer lookup: like [`SkinResolver::skin_attachment`], then any
    /// other skin in name order.
    pub fn partial_attachment<'d>(
        &self,
        data: &'d SkeletonData,
        slot: usize,
        name: &str,
    ) -> Option<&'d AttachmentData> {
        self.skin_attachment(data, slot, name).or_else(|| {
            data.skin_names()
                .into_iter()
                .filter_map(|skin| data.skin(skin))
                .find_map(|skin| skin.attachment(slot, name))
        })
    }
}
