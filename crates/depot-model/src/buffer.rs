//! Pending edit buffer
//!
//! The buffer is a local overlay on a canonical [`Depot`]. Any field it has
//! not touched falls back to the canonical value, so display and transfer
//! math always see a complete record. Incoming store snapshots never write
//! into it; only [`EditBuffer::diff`] turns it into a store update.

use crate::barrels::{BarrelCounts, BarrelDirection};
use crate::depot::Depot;
use crate::error::ValidationError;
use crate::ingest::clean_entry;
use crate::patch::DepotPatch;
use std::fmt;
use tracing::warn;

/// Installed fuel containers with free-form volume input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeField {
    /// Fixed tank
    Tank,
    /// Fuel trailer
    Trailer,
}

impl VolumeField {
    /// Stored field name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tank => "tank",
            Self::Trailer => "trailer",
        }
    }
}

impl fmt::Display for VolumeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse volume input as liters
fn parse_volume(input: &str) -> Option<u32> {
    input.trim().parse::<u32>().ok()
}

/// Unsaved edits for one depot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    full_barrels: Option<u32>,
    empty_barrels: Option<u32>,
    tank: Option<String>,
    trailer: Option<String>,
    equipment: Option<Vec<String>>,
    note: Option<String>,
}

impl EditBuffer {
    /// Empty buffer; every read falls back to the canonical record.
    ///
    /// Fields only enter the buffer when touched, so a canonical value that
    /// changes underneath an open edit never shows up in [`EditBuffer::diff`].
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current barrel counts, falling back per side to `canonical`
    #[must_use]
    pub fn barrels(&self, canonical: &Depot) -> BarrelCounts {
        BarrelCounts::new(
            self.full_barrels.unwrap_or(canonical.barrels.full),
            self.empty_barrels.unwrap_or(canonical.barrels.empty),
        )
    }

    /// Apply one transfer to the buffered counts.
    ///
    /// # Errors
    /// [`ValidationError::NotApplicable`] if the depot does not track barrels
    pub fn adjust_barrels(
        &mut self,
        canonical: &Depot,
        direction: BarrelDirection,
    ) -> Result<BarrelCounts, ValidationError> {
        if !canonical.depot_type.tracks_barrels() {
            return Err(ValidationError::NotApplicable {
                field: "fullBarrels",
                depot_type: canonical.depot_type,
            });
        }
        let next = self.barrels(canonical).transfer(direction);
        self.full_barrels = Some(next.full);
        self.empty_barrels = Some(next.empty);
        Ok(next)
    }

    /// Raw volume text as currently shown
    #[must_use]
    pub fn volume_text(&self, canonical: &Depot, field: VolumeField) -> String {
        let (buffered, fallback) = match field {
            VolumeField::Tank => (&self.tank, canonical.tank),
            VolumeField::Trailer => (&self.trailer, canonical.trailer),
        };
        buffered.clone().unwrap_or_else(|| fallback.to_string())
    }

    /// Set a volume from user input.
    ///
    /// # Errors
    /// [`ValidationError::NotANumber`] if `input` is not a non-negative integer;
    /// the buffer is left unchanged
    pub fn set_volume(&mut self, field: VolumeField, input: &str) -> Result<u32, ValidationError> {
        let liters = parse_volume(input).ok_or_else(|| ValidationError::NotANumber {
            field: field.as_str(),
            input: input.to_string(),
        })?;
        let slot = match field {
            VolumeField::Tank => &mut self.tank,
            VolumeField::Trailer => &mut self.trailer,
        };
        *slot = Some(input.trim().to_string());
        Ok(liters)
    }

    /// Current equipment list
    #[must_use]
    pub fn equipment<'a>(&'a self, canonical: &'a Depot) -> &'a [String] {
        self.equipment.as_deref().unwrap_or(&canonical.equipment)
    }

    fn equipment_mut(&mut self, canonical: &Depot) -> &mut Vec<String> {
        self.equipment
            .get_or_insert_with(|| canonical.equipment.clone())
    }

    /// Append an entry after trimming.
    ///
    /// # Errors
    /// [`ValidationError::EmptyEquipment`] if `text` is blank; nothing is added
    pub fn add_equipment(&mut self, canonical: &Depot, text: &str) -> Result<(), ValidationError> {
        let entry = clean_entry(text).ok_or(ValidationError::EmptyEquipment)?;
        self.equipment_mut(canonical).push(entry);
        Ok(())
    }

    /// Remove the entry at `index`; out-of-range indices change nothing
    pub fn remove_equipment(&mut self, canonical: &Depot, index: usize) -> Option<String> {
        if index >= self.equipment(canonical).len() {
            return None;
        }
        Some(self.equipment_mut(canonical).remove(index))
    }

    /// Current note text
    #[must_use]
    pub fn note<'a>(&'a self, canonical: &'a Depot) -> &'a str {
        self.note.as_deref().unwrap_or_else(|| canonical.note_text())
    }

    /// Replace the note
    pub fn set_note(&mut self, text: impl Into<String>) {
        self.note = Some(text.into());
    }

    /// Canonical record with buffered fields laid over it, for display
    #[must_use]
    pub fn overlay(&self, canonical: &Depot) -> Depot {
        let mut patch = self.coerced(canonical);
        // The overlay shows equipment as buffered, blanks included.
        patch.equipment = self.equipment.clone();
        patch.apply_to(canonical)
    }

    /// Fields that differ from `canonical`, coerced to their stored types.
    ///
    /// Volume text that no longer coerces is dropped with a warning rather
    /// than failing the whole diff. Equipment is trimmed and blank entries
    /// are removed before comparison.
    #[must_use]
    pub fn diff(&self, canonical: &Depot) -> DepotPatch {
        let coerced = self.coerced(canonical);
        DepotPatch {
            full_barrels: coerced.full_barrels.filter(|v| *v != canonical.barrels.full),
            empty_barrels: coerced.empty_barrels.filter(|v| *v != canonical.barrels.empty),
            tank: coerced.tank.filter(|v| *v != canonical.tank),
            trailer: coerced.trailer.filter(|v| *v != canonical.trailer),
            equipment: coerced.equipment.filter(|v| *v != canonical.equipment),
            note: coerced.note.filter(|v| v.trim() != canonical.note_text().trim()),
        }
    }

    fn coerced(&self, canonical: &Depot) -> DepotPatch {
        let volume = |field: VolumeField, text: &Option<String>| {
            let text = text.as_ref()?;
            let parsed = parse_volume(text);
            if parsed.is_none() {
                warn!(
                    depot_id = %canonical.id,
                    field = %field,
                    input = %text,
                    "dropping non-numeric field from commit"
                );
            }
            parsed
        };

        DepotPatch {
            full_barrels: self.full_barrels,
            empty_barrels: self.empty_barrels,
            tank: volume(VolumeField::Tank, &self.tank),
            trailer: volume(VolumeField::Trailer, &self.trailer),
            equipment: self
                .equipment
                .as_ref()
                .map(|items| items.iter().filter_map(clean_entry).collect()),
            note: self.note.clone(),
        }
    }

    #[cfg(test)]
    fn set_volume_raw(&mut self, field: VolumeField, input: impl Into<String>) {
        let slot = match field {
            VolumeField::Tank => &mut self.tank,
            VolumeField::Trailer => &mut self.trailer,
        };
        *slot = Some(input.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::depot::{DepotType, Position};
    use pretty_assertions::assert_eq;

    fn cache() -> Depot {
        Depot::new("c", DepotType::FuelDepot, "Cache", Position::new(1.0, 2.0).unwrap())
            .with_barrels(3, 2)
            .with_volumes(1000, 200)
            .with_equipment(["Rope", "Shovel"])
    }

    #[test]
    fn fresh_buffer_has_empty_diff() {
        let depot = cache();
        let buffer = EditBuffer::new();
        assert!(buffer.diff(&depot).is_empty());
    }

    #[test]
    fn canonical_change_during_edit_stays_out_of_diff() {
        let before = cache();
        let mut buffer = EditBuffer::new();
        buffer.set_note("mine");

        let after = before.clone().with_volumes(10, 200).with_barrels(1, 4);
        let patch = buffer.diff(&after);
        assert_eq!(patch.field_names(), vec!["note"]);
        assert_eq!(buffer.overlay(&after).tank, 10);
    }

    #[test]
    fn note_only_edit_diffs_to_note() {
        let depot = cache();
        let mut buffer = EditBuffer::new();
        buffer.set_note("low fuel");

        let patch = buffer.diff(&depot);
        assert_eq!(patch.field_names(), vec!["note"]);
        assert_eq!(patch.note.as_deref(), Some("low fuel"));
        assert_eq!(patch.tank, None);
    }

    #[test]
    fn sparse_buffer_falls_back_to_canonical() {
        let depot = cache();
        let mut buffer = EditBuffer::new();

        let counts = buffer
            .adjust_barrels(&depot, BarrelDirection::IncreaseFull)
            .unwrap();
        assert_eq!(counts, BarrelCounts::new(4, 1));
        assert_eq!(buffer.equipment(&depot), ["Rope", "Shovel"]);
        assert_eq!(buffer.volume_text(&depot, VolumeField::Tank), "1000");

        let patch = buffer.diff(&depot);
        assert_eq!(patch.full_barrels, Some(4));
        assert_eq!(patch.empty_barrels, Some(1));
        assert_eq!(patch.equipment, None);
    }

    #[test]
    fn barrels_rejected_on_helipad() {
        let pad = Depot::new("p", DepotType::Helipad, "Pad", Position::new(0.0, 0.0).unwrap());
        let mut buffer = EditBuffer::new();
        let err = buffer
            .adjust_barrels(&pad, BarrelDirection::DecreaseFull)
            .unwrap_err();
        assert!(matches!(err, ValidationError::NotApplicable { .. }));
        assert!(buffer.diff(&pad).is_empty());
    }

    #[test]
    fn invalid_volume_input_rejected_before_buffer() {
        let depot = cache();
        let mut buffer = EditBuffer::new();

        assert!(buffer.set_volume(VolumeField::Tank, "12a").is_err());
        assert!(buffer.set_volume(VolumeField::Trailer, "-5").is_err());
        assert_eq!(buffer.volume_text(&depot, VolumeField::Tank), "1000");

        assert_eq!(buffer.set_volume(VolumeField::Tank, " 1500 ").unwrap(), 1500);
        assert_eq!(buffer.diff(&depot).tank, Some(1500));
    }

    #[test]
    fn unparseable_volume_dropped_from_diff() {
        let depot = cache();
        let mut buffer = EditBuffer::new();
        buffer.set_volume_raw(VolumeField::Tank, "plenty");
        buffer.set_note("checked");

        let patch = buffer.diff(&depot);
        assert_eq!(patch.tank, None);
        assert_eq!(patch.field_names(), vec!["note"]);
    }

    #[test]
    fn equipment_add_and_remove() {
        let depot = cache();
        let mut buffer = EditBuffer::new();

        assert_eq!(buffer.add_equipment(&depot, "   "), Err(ValidationError::EmptyEquipment));
        buffer.add_equipment(&depot, "  Pump ").unwrap();
        assert_eq!(buffer.equipment(&depot), ["Rope", "Shovel", "Pump"]);

        assert_eq!(buffer.remove_equipment(&depot, 0).as_deref(), Some("Rope"));
        assert_eq!(buffer.remove_equipment(&depot, 5), None);
        assert_eq!(buffer.equipment(&depot), ["Shovel", "Pump"]);

        let patch = buffer.diff(&depot);
        assert_eq!(patch.equipment, Some(vec!["Shovel".to_string(), "Pump".to_string()]));
    }

    #[test]
    fn remove_out_of_range_is_noop_on_sparse_buffer() {
        let depot = cache();
        let mut buffer = EditBuffer::new();
        assert_eq!(buffer.remove_equipment(&depot, 5), None);
        assert_eq!(buffer, EditBuffer::new());
    }

    #[test]
    fn overlay_shows_buffered_values() {
        let depot = cache();
        let mut buffer = EditBuffer::new();
        buffer.adjust_barrels(&depot, BarrelDirection::DecreaseFull).unwrap();
        buffer.set_note("two used");

        let shown = buffer.overlay(&depot);
        assert_eq!(shown.barrels, BarrelCounts::new(2, 3));
        assert_eq!(shown.note.as_deref(), Some("two used"));
        assert_eq!(depot.barrels, BarrelCounts::new(3, 2));
    }
}
