use crate::Rect;
use serde::{Deserialize, Serialize};

// Outer padding between the dock frame and its first/last row.
pub const ROW_PADDING: f64 = 8.0;
// Gap between two icon rows.
pub const ROW_SPACING: f64 = 8.0;
// Gap between the last icon row and the control strip.
pub const CONTROL_STRIP_SPACING: f64 = 12.0;
// Horizontal inset of the control strip.
pub const CONTROL_STRIP_INSET: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    #[default]
    Bottom,
    Top,
    Left,
    Right,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Bottom, Edge::Top, Edge::Left, Edge::Right];

    // Maps the persisted dock position (0-3) to an edge.
    pub fn from_position(position: i64) -> Option<Self> {
        match position {
            0 => Some(Self::Bottom),
            1 => Some(Self::Top),
            2 => Some(Self::Left),
            3 => Some(Self::Right),
            _ => None,
        }
    }

    pub fn position(&self) -> i64 {
        match self {
            Self::Bottom => 0,
            Self::Top => 1,
            Self::Left => 2,
            Self::Right => 3,
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "bottom" => Some(Self::Bottom),
            "top" => Some(Self::Top),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::Bottom | Self::Top)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bottom => "Bottom",
            Self::Top => "Top",
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

pub fn max_icons_per_row(width: f64, icon_size: f64) -> usize {
    if width.is_nan() || icon_size.is_nan() || width <= 0.0 || icon_size <= 0.0 {
        return 1;
    }
    ((width / icon_size).floor() as usize).max(1)
}

pub fn split_rows<T: Clone>(items: &[T], per_row: usize) -> Vec<Vec<T>> {
    items
        .chunks(per_row.max(1))
        .map(|chunk| chunk.to_vec())
        .collect()
}

// Bottom-left origin: the bottom edge sits at the screen's minimum Y.
pub fn frame_for(screen: Rect, edge: Edge, thickness: f64) -> Rect {
    let extent = if edge.is_horizontal() {
        screen.height
    } else {
        screen.width
    };
    let thickness = thickness.max(0.0).min(extent.max(0.0));

    match edge {
        Edge::Bottom => Rect::new(screen.min_x(), screen.min_y(), screen.width, thickness),
        Edge::Top => Rect::new(
            screen.min_x(),
            screen.max_y() - thickness,
            screen.width,
            thickness,
        ),
        Edge::Left => Rect::new(screen.min_x(), screen.min_y(), thickness, screen.height),
        Edge::Right => Rect::new(
            screen.max_x() - thickness,
            screen.min_y(),
            thickness,
            screen.height,
        ),
    }
}

// Frame of a dock slid off-screen, leaving `peek` points visible so the
// pointer can still hover it.
pub fn hidden_frame(frame: Rect, edge: Edge, peek: f64) -> Rect {
    let along_normal = if edge.is_horizontal() {
        frame.height
    } else {
        frame.width
    };
    let offset = (along_normal - peek.max(0.0)).max(0.0);

    match edge {
        Edge::Bottom => Rect::new(frame.x, frame.y - offset, frame.width, frame.height),
        Edge::Top => Rect::new(frame.x, frame.y + offset, frame.width, frame.height),
        Edge::Left => Rect::new(frame.x - offset, frame.y, frame.width, frame.height),
        Edge::Right => Rect::new(frame.x + offset, frame.y, frame.width, frame.height),
    }
}

// Linear interpolation between two frames; `t` is clamped to `[0, 1]`.
pub fn slide_step(from: Rect, to: Rect, t: f64) -> Rect {
    let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
    let lerp = |a: f64, b: f64| a + (b - a) * t;
    Rect::new(
        lerp(from.x, to.x),
        lerp(from.y, to.y),
        lerp(from.width, to.width),
        lerp(from.height, to.height),
    )
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions {
    pub icon_size: f64,
    pub multi_row: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconRow {
    pub frame: Rect,
    pub icons: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DockLayout {
    pub frame: Rect,
    pub edge: Edge,
    pub per_row: usize,
    pub rows: Vec<IconRow>,
    pub control_strip: Rect,
}

impl DockLayout {
    // Rows stack top-to-bottom (decreasing Y); the control strip comes last.
    pub fn compute(frame: Rect, edge: Edge, icon_count: usize, options: LayoutOptions) -> Self {
        let inner_width = (frame.width - 2.0 * ROW_PADDING).max(0.0);
        let per_row = if options.multi_row {
            max_icons_per_row(inner_width, options.icon_size)
        } else {
            icon_count.max(1)
        };

        let indices: Vec<usize> = (0..icon_count).collect();
        let grouped = if options.multi_row {
            split_rows(&indices, per_row)
        } else if indices.is_empty() {
            Vec::new()
        } else {
            vec![indices]
        };

        let mut cursor = frame.max_y() - ROW_PADDING;
        let mut rows = Vec::with_capacity(grouped.len());
        for (i, icons) in grouped.into_iter().enumerate() {
            if i > 0 {
                cursor -= ROW_SPACING;
            }
            let row_frame = Rect::new(
                frame.x + ROW_PADDING,
                cursor - options.icon_size,
                inner_width,
                options.icon_size,
            );
            cursor = row_frame.min_y();
            rows.push(IconRow {
                frame: row_frame,
                icons,
            });
        }

        if !rows.is_empty() {
            cursor -= CONTROL_STRIP_SPACING;
        }
        let strip_bottom = (frame.min_y() + ROW_PADDING).min(cursor);
        let control_strip = Rect::new(
            frame.x + CONTROL_STRIP_INSET,
            strip_bottom,
            (frame.width - 2.0 * CONTROL_STRIP_INSET).max(0.0),
            (cursor - strip_bottom).max(0.0),
        );

        Self {
            frame,
            edge,
            per_row,
            rows,
            control_strip,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 1920.0,
        height: 1080.0,
    };

    #[test]
    fn icons_per_row_floors_and_never_drops_below_one() {
        assert_eq!(max_icons_per_row(320.0, 64.0), 5);
        assert_eq!(max_icons_per_row(128.0, 64.0), 2);
        assert_eq!(max_icons_per_row(60.0, 64.0), 1);
        assert_eq!(max_icons_per_row(0.0, 64.0), 1);
        assert_eq!(max_icons_per_row(320.0, 0.0), 1);
        assert_eq!(max_icons_per_row(f64::NAN, 64.0), 1);
    }

    #[test]
    fn split_rows_keeps_order_and_sizes() {
        let items: Vec<u32> = (0..10).collect();
        let rows = split_rows(&items, 4);
        let sizes: Vec<usize> = rows.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(rows.concat(), items);

        assert!(split_rows::<u32>(&[], 4).is_empty());
        assert_eq!(split_rows(&[1, 2, 3], 0).len(), 3);
    }

    #[test]
    fn split_rows_matches_ceiling_division() {
        for n in 0..25usize {
            for k in 1..7usize {
                let items: Vec<usize> = (0..n).collect();
                let rows = split_rows(&items, k);
                assert_eq!(rows.len(), (n + k - 1) / k);
                if let Some((last, full)) = rows.split_last() {
                    assert!(full.iter().all(|r| r.len() == k));
                    assert!(!last.is_empty() && last.len() <= k);
                }
            }
        }
    }

    #[test]
    fn frame_touches_the_requested_screen_edge() {
        let screen = Rect::new(100.0, 50.0, 1440.0, 900.0);
        let thickness = 48.0;

        let bottom = frame_for(screen, Edge::Bottom, thickness);
        assert_eq!(bottom.y, screen.min_y());
        assert_eq!(bottom.width, screen.width);

        let top = frame_for(screen, Edge::Top, thickness);
        assert_eq!(top.y + thickness, screen.max_y());

        let left = frame_for(screen, Edge::Left, thickness);
        assert_eq!(left.x, screen.min_x());
        assert_eq!(left.height, screen.height);

        let right = frame_for(screen, Edge::Right, thickness);
        assert_eq!(right.x + thickness, screen.max_x());
    }

    #[test]
    fn frame_clamps_thickness() {
        let frame = frame_for(SCREEN, Edge::Bottom, -5.0);
        assert_eq!(frame.height, 0.0);
        let frame = frame_for(SCREEN, Edge::Left, 5000.0);
        assert_eq!(frame.width, SCREEN.width);
    }

    #[test]
    fn hidden_frame_leaves_peek_visible() {
        let frame = frame_for(SCREEN, Edge::Bottom, 80.0);
        let hidden = hidden_frame(frame, Edge::Bottom, 4.0);
        assert_eq!(hidden.max_y(), SCREEN.min_y() + 4.0);

        let frame = frame_for(SCREEN, Edge::Right, 80.0);
        let hidden = hidden_frame(frame, Edge::Right, 4.0);
        assert_eq!(hidden.min_x(), SCREEN.max_x() - 4.0);
    }

    #[test]
    fn slide_step_clamps_progress() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(100.0, 50.0, 10.0, 10.0);
        assert_eq!(slide_step(a, b, 0.5), Rect::new(50.0, 25.0, 10.0, 10.0));
        assert_eq!(slide_step(a, b, -1.0), a);
        assert_eq!(slide_step(a, b, 3.0), b);
    }

    #[test]
    fn edge_positions_round_trip() {
        for edge in Edge::ALL {
            assert_eq!(Edge::from_position(edge.position()), Some(edge));
        }
        assert_eq!(Edge::from_position(7), None);
    }

    #[test]
    fn multi_row_layout_wraps_icons() {
        let frame = Rect::new(0.0, 0.0, 336.0, 400.0);
        let options = LayoutOptions {
            icon_size: 64.0,
            multi_row: true,
        };
        let layout = DockLayout::compute(frame, Edge::Bottom, 12, options);
        assert_eq!(layout.per_row, 5);
        assert_eq!(layout.row_count(), 3);
        assert_eq!(layout.rows[2].icons, vec![10, 11]);

        // rows descend from the top with fixed spacing
        assert_eq!(layout.rows[0].frame.max_y(), frame.max_y() - ROW_PADDING);
        assert_eq!(
            layout.rows[0].frame.min_y() - layout.rows[1].frame.max_y(),
            ROW_SPACING
        );
        assert!(layout.control_strip.max_y() <= layout.rows[2].frame.min_y());
    }

    #[test]
    fn single_row_layout_ignores_width() {
        let frame = Rect::new(0.0, 0.0, 200.0, 200.0);
        let options = LayoutOptions {
            icon_size: 64.0,
            multi_row: false,
        };
        let layout = DockLayout::compute(frame, Edge::Bottom, 9, options);
        assert_eq!(layout.row_count(), 1);
        assert_eq!(layout.rows[0].icons.len(), 9);
    }

    #[test]
    fn empty_layout_still_has_control_strip() {
        let frame = Rect::new(0.0, 0.0, 400.0, 100.0);
        let options = LayoutOptions {
            icon_size: 64.0,
            multi_row: true,
        };
        let layout = DockLayout::compute(frame, Edge::Top, 0, options);
        assert!(layout.rows.is_empty());
        assert_eq!(layout.control_strip.min_y(), ROW_PADDING);
        assert_eq!(layout.control_strip.max_y(), frame.max_y() - ROW_PADDING);
    }
}
