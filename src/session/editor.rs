//! Pointer-input state machine for interactive annotation editing.
//!
//! Press/move/release events drive an explicit finite state machine with
//! states `Idle`, `Drawing`, `Dragging`, and `Resizing`. Each transition is
//! keyed on the current state plus the incoming event, so there are no
//! shared mode flags to get out of sync between handlers.

use crate::constants::CLICK_AREA_THRESHOLD;
use crate::geometry::{Corner, Point, Rect, clamp_point};
use crate::model::{AnnotationItem, SeedLabel, SeedPoint};

use super::annotation_set::{AnnotationSet, ItemId};

/// Which pointer button an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// A pointer event delivered to the editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Press { pos: Point, button: PointerButton },
    Move { pos: Point },
    Release { pos: Point, button: PointerButton },
}

/// Editor FSM state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorState {
    /// Nothing in flight.
    Idle,
    /// Rubber-banding a new box; `candidate` is kept intersected with the
    /// image bounds on every move.
    Drawing { start: Point, candidate: Rect },
    /// Moving a whole item; `last` is the previous pointer position.
    Dragging { id: ItemId, last: Point },
    /// Resizing a box by one grabbed corner.
    Resizing { id: ItemId, corner: Corner },
}

impl Default for EditorState {
    fn default() -> Self {
        EditorState::Idle
    }
}

/// What a transition produced, for the session to act on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorOutcome {
    /// A drag gesture finished with a real rectangle; the box still needs a
    /// class label before it is committed to the set.
    BoxDrawn(Rect),
    /// A click-like gesture placed a seed point (already inserted).
    SeedPlaced(ItemId),
    /// An existing item was picked up.
    Selected(ItemId),
    /// The grabbed item moved.
    Moved(ItemId),
    /// The grabbed box was resized.
    Resized(ItemId),
    /// Press on empty canvas outside the image.
    SelectionCleared,
}

/// The pointer-editing state machine.
#[derive(Debug, Default)]
pub struct Editor {
    state: EditorState,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, EditorState::Idle)
    }

    /// Feed one event through the transition table.
    ///
    /// `bounds` is the image's displayed rectangle; all clamping is against
    /// it. Drag and resize mutate `set` directly; box creation is reported
    /// via [`EditorOutcome::BoxDrawn`] so the caller can run its class
    /// assignment flow before committing.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        set: &mut AnnotationSet,
        bounds: Rect,
    ) -> Option<EditorOutcome> {
        match (self.state, event) {
            (
                EditorState::Idle,
                PointerEvent::Press {
                    pos,
                    button: PointerButton::Primary,
                },
            ) => {
                if let Some((id, corner)) = set.corner_at(pos) {
                    self.state = EditorState::Resizing { id, corner };
                    Some(EditorOutcome::Selected(id))
                } else if let Some(id) = set.item_at(pos) {
                    self.state = EditorState::Dragging { id, last: pos };
                    Some(EditorOutcome::Selected(id))
                } else if bounds.contains_point(pos) {
                    self.state = EditorState::Drawing {
                        start: pos,
                        candidate: Rect::from_corners(pos, pos),
                    };
                    None
                } else {
                    Some(EditorOutcome::SelectionCleared)
                }
            }

            (
                EditorState::Idle,
                PointerEvent::Release {
                    pos,
                    button: PointerButton::Secondary,
                },
            ) => {
                // Right click drops a background hint for the predictor.
                let seed = SeedPoint::create_at(pos, SeedLabel::Negative, &bounds);
                Some(EditorOutcome::SeedPlaced(set.insert_seed(seed)))
            }

            (EditorState::Drawing { start, .. }, PointerEvent::Move { pos }) => {
                self.state = EditorState::Drawing {
                    start,
                    candidate: Rect::from_drag(start, pos, &bounds),
                };
                None
            }

            (
                EditorState::Drawing { start, .. },
                PointerEvent::Release {
                    pos,
                    button: PointerButton::Primary,
                },
            ) => {
                self.state = EditorState::Idle;
                let candidate = Rect::from_drag(start, pos, &bounds);
                if candidate.area() < CLICK_AREA_THRESHOLD {
                    // Degenerate gesture: reclassified as a foreground seed.
                    let seed = SeedPoint::create_at(pos, SeedLabel::Positive, &bounds);
                    Some(EditorOutcome::SeedPlaced(set.insert_seed(seed)))
                } else {
                    Some(EditorOutcome::BoxDrawn(candidate))
                }
            }

            (EditorState::Dragging { id, last }, PointerEvent::Move { pos }) => {
                let dx = pos.x - last.x;
                let dy = pos.y - last.y;
                self.state = EditorState::Dragging { id, last: pos };

                let box_rect = set.get(id).and_then(AnnotationItem::as_box).map(|b| b.rect);
                let seed_pos = set
                    .get(id)
                    .and_then(AnnotationItem::as_seed)
                    .map(|s| s.position);
                let moved = if let Some(rect) = box_rect {
                    set.set_box_rect(id, rect.translate(dx, dy, &bounds))
                } else if let Some(position) = seed_pos {
                    let p =
                        clamp_point(Point::new(position.x + dx, position.y + dy), &bounds);
                    set.set_seed_position(id, p)
                } else {
                    false
                };
                moved.then_some(EditorOutcome::Moved(id))
            }

            (EditorState::Resizing { id, corner }, PointerEvent::Move { pos }) => {
                let rect = set.get(id).and_then(|item| item.as_box()).map(|b| b.rect);
                let resized = match rect {
                    Some(rect) => set.set_box_rect(id, rect.resize_corner(corner, pos, &bounds)),
                    None => false,
                };
                resized.then_some(EditorOutcome::Resized(id))
            }

            (
                EditorState::Dragging { .. } | EditorState::Resizing { .. },
                PointerEvent::Release {
                    button: PointerButton::Primary,
                    ..
                },
            ) => {
                self.state = EditorState::Idle;
                None
            }

            // Everything else: no transition.
            _ => None,
        }
    }
}
