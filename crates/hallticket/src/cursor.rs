//! Layout cursor
//!
//! Tracks the page and vertical offset a composition has reached. Between
//! operations `margin <= y <= height - margin` always holds.

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub gutter: f64,
}

impl PageGeometry {
    /// Width between the left and right margins
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// Lowest y content may reach
    pub fn bottom(&self) -> f64 {
        self.height - self.margin
    }

    /// Height between the top and bottom margins
    pub fn usable_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }

    /// The band between the margins, split by the page gutter
    pub fn content_band(&self) -> ColumnBand {
        ColumnBand {
            x: self.margin,
            width: self.content_width(),
            gutter: self.gutter,
        }
    }
}

/// A horizontal band split into equal columns separated by a gutter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnBand {
    pub x: f64,
    pub width: f64,
    pub gutter: f64,
}

impl ColumnBand {
    /// Width of one of `columns` equal columns, never below one point
    pub fn column_width(&self, columns: usize) -> f64 {
        let columns = columns.max(1) as f64;
        ((self.width - self.gutter * (columns - 1.0)) / columns).max(1.0)
    }

    /// Absolute x of `column` when the band is split into `columns`
    pub fn column_x(&self, column: usize, columns: usize) -> f64 {
        self.x + column as f64 * (self.column_width(columns) + self.gutter)
    }

    /// The same band narrowed by `left` and `right`
    pub fn inset(&self, left: f64, right: f64) -> ColumnBand {
        ColumnBand {
            x: self.x + left,
            width: (self.width - left - right).max(1.0),
            gutter: self.gutter,
        }
    }
}

/// Where a reserved block goes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Page index, 0-based
    pub page: usize,
    /// Top of the block
    pub y: f64,
    /// Whether this reservation started a new page
    pub page_break: bool,
    /// The block is taller than the space a page can offer
    pub overflow: bool,
}

#[derive(Debug, Clone)]
pub struct LayoutCursor {
    geometry: PageGeometry,
    /// Space kept at the top of continuation pages
    header_height: f64,
    page_index: usize,
    y: f64,
    /// Nothing has been placed on the current page yet
    fresh: bool,
}

impl LayoutCursor {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            header_height: 0.0,
            page_index: 0,
            y: geometry.margin,
            fresh: true,
        }
    }

    /// Keep `height` free at the top of every page after the first
    pub fn with_continuation_header(mut self, height: f64) -> Self {
        self.header_height = height.max(0.0);
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    /// Pages touched so far
    pub fn page_count(&self) -> usize {
        self.page_index + 1
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Space left on the current page
    pub fn remaining(&self) -> f64 {
        self.geometry.bottom() - self.y
    }

    /// Whether a block of `height` fits below the current offset
    pub fn fits(&self, height: f64) -> bool {
        self.y + height <= self.geometry.bottom()
    }

    /// First y on the given page
    fn page_start(&self, page_index: usize) -> f64 {
        let start = if page_index == 0 {
            self.geometry.margin
        } else {
            self.geometry.margin + self.header_height
        };
        start.min(self.geometry.bottom())
    }

    /// Height available to a block on a fresh continuation page
    pub fn usable_height(&self) -> f64 {
        self.geometry.bottom() - self.page_start(1)
    }

    /// Claim space for a block of `height`, breaking the page first if needed
    ///
    /// A page that is still empty never breaks; a block that does not fit
    /// there is placed at the top and flagged as overflow.
    pub fn reserve(&mut self, height: f64) -> Placement {
        let height = height.max(0.0);
        let mut page_break = false;

        if !self.fits(height) && !self.fresh {
            self.start_new_page();
            page_break = true;
        }

        Placement {
            page: self.page_index,
            y: self.y,
            page_break,
            overflow: !self.fits(height),
        }
    }

    /// Move past `height` without drawing, stopping at the bottom margin
    pub fn advance(&mut self, height: f64) {
        if height <= 0.0 {
            return;
        }
        self.y = (self.y + height).min(self.geometry.bottom());
        self.fresh = false;
    }

    pub fn start_new_page(&mut self) {
        self.page_index += 1;
        self.y = self.page_start(self.page_index);
        self.fresh = true;
        log::debug!("page break: now on page {}", self.page_index + 1);
    }
}
