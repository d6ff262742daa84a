//! Pages of one record, created on demand

use ticket_pdf::{Page, Rect, Stroke};

const BORDER_WIDTH: f64 = 1.2;

/// Growing list of bordered pages
#[derive(Debug, Clone)]
pub(crate) struct Canvas {
    pages: Vec<Page>,
    border: Rect,
}

impl Canvas {
    pub fn new(page_width: f64, page_height: f64, border_inset: f64) -> Self {
        let border = Rect::new(
            border_inset,
            border_inset,
            page_width - 2.0 * border_inset,
            page_height - 2.0 * border_inset,
        );
        let mut canvas = Self {
            pages: Vec::new(),
            border,
        };
        canvas.page_mut(0);
        canvas
    }

    /// Page at `index`, adding bordered pages up to it
    pub fn page_mut(&mut self, index: usize) -> &mut Page {
        while self.pages.len() <= index {
            let mut page = Page::new();
            page.push_rect(self.border, Some(Stroke::solid(BORDER_WIDTH)), None);
            self.pages.push(page);
        }
        &mut self.pages[index]
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}
