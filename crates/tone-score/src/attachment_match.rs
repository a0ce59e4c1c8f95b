//! Attachment-aware tone-bucket matching (spec §4.12): "an item's
//! `triggerTone` matches the user tone if (a) equal, or (b) both map to the
//! same UI bucket under the per-attachment mapping."
//!
//! Built once from `toneBucketMapping.attachmentOverrides` at config-build
//! time (spec §9 design note: "compute a tone→uiBucket table per attachment
//! style at config-build time... so matching is O(1) at scoring time").

use std::collections::HashMap;
use tone_config::ToneBucketMapping;
use tone_core::Bucket;

/// The minimum positive attachment-override delta that counts as "this
/// style remaps `from` toward `to`" rather than noise (spec §9: avoidant
/// escalates withdrawn/sad/anxious to alert, anxious demotes withdrawn to
/// caution — these are clear, large deltas, not rounding error).
const REMAP_EPS: f64 = 0.05;

/// `(attachment_style, from_bucket) -> remapped_to_bucket`, derived once
/// from the bucket-mapping overrides.
#[derive(Debug, Clone, Default)]
pub struct AttachmentToneMap {
    table: HashMap<(String, Bucket), Bucket>,
}

impl AttachmentToneMap {
    pub fn build(mapping: &ToneBucketMapping) -> Self {
        let mut table = HashMap::new();
        for (style, by_label) in &mapping.attachment_overrides {
            for from in Bucket::ALL {
                let mut best: Option<(Bucket, f64)> = None;
                if let Some(delta) = by_label.get(from.as_str()) {
                    for (to, value) in [
                        (Bucket::Clear, delta.clear),
                        (Bucket::Caution, delta.caution),
                        (Bucket::Alert, delta.alert),
                    ] {
                        if to == from {
                            continue;
                        }
                        if value > REMAP_EPS && best.map(|(_, v)| value > v).unwrap_or(true) {
                            best = Some((to, value));
                        }
                    }
                }
                if let Some((to, _)) = best {
                    table.insert((style.clone(), from), to);
                }
            }
        }
        Self { table }
    }

    /// `true` when `item_tone` equals `user_bucket`, or the attachment
    /// style's derived table remaps `user_bucket` onto `item_tone`.
    pub fn matches(&self, style: &str, user_bucket: Bucket, item_tone: Bucket) -> bool {
        if user_bucket == item_tone {
            return true;
        }
        self.table.get(&(style.to_string(), user_bucket)) == Some(&item_tone)
    }
}
