use crate::layout::{frame_for, Edge};
use crate::Rect;
use log::debug;

// Ties go to the first edge in `Edge::ALL` order.
pub fn closest_edge(window: Rect, screen: Rect, threshold: f64) -> Option<Edge> {
    if threshold.is_nan() || threshold < 0.0 {
        return None;
    }

    let distances = [
        (Edge::Bottom, (window.min_y() - screen.min_y()).abs()),
        (Edge::Top, (screen.max_y() - window.max_y()).abs()),
        (Edge::Left, (window.min_x() - screen.min_x()).abs()),
        (Edge::Right, (screen.max_x() - window.max_x()).abs()),
    ];

    let mut best: Option<(Edge, f64)> = None;
    for (edge, distance) in distances {
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((edge, distance)),
        }
    }

    best.filter(|(_, distance)| *distance <= threshold)
        .map(|(edge, _)| edge)
}

#[derive(Debug, Clone, PartialEq)]
pub enum DragResult {
    SnapToEdge(Edge, Rect),
    ReturnToEdge(Rect),
    NoAction,
}

#[derive(Debug, Clone)]
struct DragState {
    initial_frame: Rect,
}

pub struct EdgeSnapper {
    screen_rect: Rect,
    snap_threshold: f64,
    thickness: f64,
    drag_state: Option<DragState>,
}

impl EdgeSnapper {
    pub fn new(screen_rect: Rect, snap_threshold: f64, thickness: f64) -> Self {
        Self {
            screen_rect,
            snap_threshold,
            thickness,
            drag_state: None,
        }
    }

    pub fn update_screen_rect(&mut self, screen_rect: Rect) {
        debug!("Snap screen bounds updated: {:?}", screen_rect);
        self.screen_rect = screen_rect;
    }

    pub fn screen_rect(&self) -> Rect {
        self.screen_rect
    }

    pub fn start_drag(&mut self, current_frame: Rect) {
        self.drag_state = Some(DragState {
            initial_frame: current_frame,
        });
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_state.is_some()
    }

    // Ends a drag at `final_frame`. `current_edge` is where the dock was
    // attached before the drag started.
    pub fn end_drag(&mut self, final_frame: Rect, current_edge: Edge) -> DragResult {
        let Some(state) = self.drag_state.take() else {
            debug!("Drag ended without a recorded start");
            return DragResult::NoAction;
        };

        match closest_edge(final_frame, self.screen_rect, self.snap_threshold) {
            Some(edge) => {
                debug!(
                    "Dock dropped near {} edge (from {:?})",
                    edge.name(),
                    state.initial_frame
                );
                DragResult::SnapToEdge(edge, frame_for(self.screen_rect, edge, self.thickness))
            }
            None => {
                debug!("Dock dropped away from every edge, returning to {}", current_edge.name());
                DragResult::ReturnToEdge(frame_for(self.screen_rect, current_edge, self.thickness))
            }
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag_state = None;
    }
}
