use image::Rgba;
use reelshelf_model::TopItem;

use super::card::ShareCard;
use super::glyphs::GlyphRasterizer;

pub const CANVAS_WIDTH: u32 = 700;
pub const CANVAS_HEIGHT: u32 = 500;

pub const BACKGROUND: Rgba<u8> = Rgba([0x1e, 0x1e, 0x2e, 0xff]);
pub const ACCENT: Rgba<u8> = Rgba([0x89, 0xb4, 0xfa, 0xff]);
pub const TEXT: Rgba<u8> = Rgba([0xcd, 0xd6, 0xf4, 0xff]);
pub const MUTED: Rgba<u8> = Rgba([0xa6, 0xad, 0xc8, 0xff]);

pub const BORDER_WIDTH: u32 = 2;
pub const LEFT_MARGIN: i32 = 30;
pub const COLUMN_GUTTER: i32 = 40;

const HEADER_PX: f32 = 34.0;
const HEADER_BASELINE: i32 = 60;
const DIVIDER_Y: i32 = 80;
const DIVIDER_HEIGHT: u32 = 2;
const HEADING_PX: f32 = 22.0;
const HEADING_BASELINE: i32 = 120;
const LINE_PX: f32 = 18.0;
const FIRST_LINE_BASELINE: i32 = 155;
const LINE_SPACING: i32 = 30;
const DATE_PX: f32 = 14.0;
const DATE_BASELINE: i32 = CANVAS_HEIGHT as i32 - 20;
const LOGO_ORIGIN: i32 = 14;
const LOGO_SIZE: u32 = 16;
const LOGO_INSET: u32 = 4;

pub const BOOKS_HEADING: &str = "Top books";
pub const MOVIES_HEADING: &str = "Top movies";

/// A string placed at an explicit pen position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: i32,
    pub baseline: i32,
    pub px: f32,
    pub color: Rgba<u8>,
    /// Measured advance width, kept for bounding-box checks.
    pub width: f32,
}

impl TextRun {
    fn measured(
        glyphs: &dyn GlyphRasterizer,
        text: String,
        x: i32,
        baseline: i32,
        px: f32,
        color: Rgba<u8>,
    ) -> Self {
        let width = glyphs.measure(&text, px);
        Self {
            text,
            x,
            baseline,
            px,
            color,
            width,
        }
    }

    pub fn right(&self) -> f32 {
        self.x as f32 + self.width
    }
}

/// One ranked list: a heading followed by numbered lines.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub x: i32,
    pub heading: TextRun,
    pub lines: Vec<TextRun>,
}

impl Column {
    fn measure(
        glyphs: &dyn GlyphRasterizer,
        x: i32,
        heading: &str,
        items: &[TopItem],
    ) -> Self {
        let heading = TextRun::measured(
            glyphs,
            heading.to_string(),
            x,
            HEADING_BASELINE,
            HEADING_PX,
            ACCENT,
        );
        let lines = items
            .iter()
            .enumerate()
            .map(|(rank, item)| {
                TextRun::measured(
                    glyphs,
                    format!("{}. {} ({})", rank + 1, item.title, item.score),
                    x,
                    FIRST_LINE_BASELINE + rank as i32 * LINE_SPACING,
                    LINE_PX,
                    TEXT,
                )
            })
            .collect();

        Self { x, heading, lines }
    }

    /// Widest of the heading and every line.
    pub fn width(&self) -> f32 {
        self.lines
            .iter()
            .map(|line| line.width)
            .fold(self.heading.width, f32::max)
    }
}

/// A single paint operation in canvas coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill(Rgba<u8>),
    Rect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Rgba<u8>,
    },
    Text(TextRun),
}

/// Fully measured share card. Every coordinate is fixed here; painting only
/// replays [`ShareLayout::commands`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShareLayout {
    pub width: u32,
    pub height: u32,
    pub header: TextRun,
    pub divider_y: i32,
    pub books: Option<Column>,
    pub movies: Option<Column>,
    pub date_stamp: TextRun,
}

impl ShareLayout {
    /// Measure phase. The movie column's x depends on the measured width of
    /// the book column, so books are measured first.
    pub fn measure(card: &ShareCard, glyphs: &dyn GlyphRasterizer) -> Self {
        let header_width = glyphs.measure(&card.username, HEADER_PX);
        let header_x = ((CANVAS_WIDTH as f32 - header_width) / 2.0)
            .round()
            .max(0.0) as i32;
        let header = TextRun {
            text: card.username.clone(),
            x: header_x,
            baseline: HEADER_BASELINE,
            px: HEADER_PX,
            color: TEXT,
            width: header_width,
        };

        let books = (!card.books.is_empty()).then(|| {
            Column::measure(glyphs, LEFT_MARGIN, BOOKS_HEADING, &card.books)
        });

        let movies_x = match &books {
            Some(column) => {
                LEFT_MARGIN + column.width().ceil() as i32 + COLUMN_GUTTER
            }
            None => LEFT_MARGIN,
        };
        let movies = (!card.movies.is_empty()).then(|| {
            Column::measure(glyphs, movies_x, MOVIES_HEADING, &card.movies)
        });

        let date_text = card.date.format("%Y-%m-%d").to_string();
        let date_width = glyphs.measure(&date_text, DATE_PX);
        let date_stamp = TextRun {
            text: date_text,
            x: CANVAS_WIDTH as i32 - LEFT_MARGIN - date_width.ceil() as i32,
            baseline: DATE_BASELINE,
            px: DATE_PX,
            color: MUTED,
            width: date_width,
        };

        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            header,
            divider_y: DIVIDER_Y,
            books,
            movies,
            date_stamp,
        }
    }

    /// Paint order: background, border, logotype, header, divider, columns,
    /// date stamp.
    pub fn commands(&self) -> Vec<DrawCommand> {
        let (w, h) = (self.width, self.height);
        let b = BORDER_WIDTH;
        let mut commands = vec![
            DrawCommand::Fill(BACKGROUND),
            rect(0, 0, w, b, ACCENT),
            rect(0, (h - b) as i32, w, b, ACCENT),
            rect(0, 0, b, h, ACCENT),
            rect((w - b) as i32, 0, b, h, ACCENT),
            rect(LOGO_ORIGIN, LOGO_ORIGIN, LOGO_SIZE, LOGO_SIZE, ACCENT),
            rect(
                LOGO_ORIGIN + LOGO_INSET as i32,
                LOGO_ORIGIN + LOGO_INSET as i32,
                LOGO_SIZE - 2 * LOGO_INSET,
                LOGO_SIZE - 2 * LOGO_INSET,
                BACKGROUND,
            ),
            DrawCommand::Text(self.header.clone()),
            rect(
                LEFT_MARGIN,
                self.divider_y,
                w - 2 * LEFT_MARGIN as u32,
                DIVIDER_HEIGHT,
                MUTED,
            ),
        ];

        for column in self.books.iter().chain(self.movies.iter()) {
            commands.push(DrawCommand::Text(column.heading.clone()));
            commands
                .extend(column.lines.iter().cloned().map(DrawCommand::Text));
        }

        commands.push(DrawCommand::Text(self.date_stamp.clone()));
        commands
    }
}

fn rect(x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) -> DrawCommand {
    DrawCommand::Rect {
        x,
        y,
        width,
        height,
        color,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::share::glyphs::FixedAdvanceGlyphs;

    fn item(title: &str, score: i16) -> TopItem {
        TopItem {
            title: title.to_string(),
            score,
            end_date: None,
        }
    }

    fn card(books: Vec<TopItem>, movies: Vec<TopItem>) -> ShareCard {
        ShareCard::new(
            "ada",
            books,
            movies,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        )
    }

    #[test]
    fn three_books_and_no_movies() {
        let card = card(
            vec![item("Dune", 9), item("Emma", 9), item("Ubik", 7)],
            Vec::new(),
        );
        let layout = ShareLayout::measure(&card, &FixedAdvanceGlyphs);

        let books = layout.books.as_ref().unwrap();
        assert_eq!(books.lines.len(), 3);
        assert!(layout.movies.is_none());
        assert_eq!(books.x, LEFT_MARGIN);
        assert_eq!(books.lines[0].text, "1. Dune (9)");
        assert_eq!(books.lines[2].baseline, FIRST_LINE_BASELINE + 2 * LINE_SPACING);
    }

    #[test]
    fn movie_column_starts_after_widest_book_line() {
        let long = "A Very Long Book Title Indeed";
        let card = card(
            vec![item("Dune", 9), item(long, 8)],
            vec![item("Alien", 10)],
        );
        let layout = ShareLayout::measure(&card, &FixedAdvanceGlyphs);

        let books = layout.books.as_ref().unwrap();
        let movies = layout.movies.as_ref().unwrap();
        // "2. A Very Long Book Title... (8)" is 32 chars at 9px each.
        assert_eq!(books.width(), 288.0);
        assert_eq!(movies.x, LEFT_MARGIN + 288 + COLUMN_GUTTER);
        for line in &books.lines {
            assert!(line.right() + COLUMN_GUTTER as f32 <= movies.x as f32);
        }
    }

    #[test]
    fn heading_counts_toward_column_width() {
        let card = card(vec![item("It", 5)], vec![item("Up", 6)]);
        let layout = ShareLayout::measure(&card, &FixedAdvanceGlyphs);

        // "Top books" at 22px (99px) is wider than "1. It (5)" at 18px (81px).
        let movies = layout.movies.as_ref().unwrap();
        assert_eq!(movies.x, LEFT_MARGIN + 99 + COLUMN_GUTTER);
    }

    #[test]
    fn empty_book_list_puts_movies_at_the_margin() {
        let card = card(Vec::new(), vec![item("Alien", 10), item("Heat", 8)]);
        let layout = ShareLayout::measure(&card, &FixedAdvanceGlyphs);

        assert!(layout.books.is_none());
        let movies = layout.movies.as_ref().unwrap();
        assert_eq!(movies.x, LEFT_MARGIN);
        assert_eq!(movies.lines.len(), 2);
    }

    #[test]
    fn header_is_centered_and_date_is_bottom_right() {
        let card = card(vec![item("Dune", 9)], Vec::new());
        let layout = ShareLayout::measure(&card, &FixedAdvanceGlyphs);

        // "ada" at 34px is 51px wide.
        assert_eq!(layout.header.x, 325);
        assert_eq!(layout.date_stamp.text, "2025-03-01");
        assert_eq!(layout.date_stamp.x, 700 - 30 - 70);
        assert!(layout.date_stamp.baseline > FIRST_LINE_BASELINE + 9 * LINE_SPACING);
    }

    #[test]
    fn commands_start_with_background_and_end_with_date() {
        let card = card(vec![item("Dune", 9)], vec![item("Alien", 10)]);
        let layout = ShareLayout::measure(&card, &FixedAdvanceGlyphs);
        let commands = layout.commands();

        assert_eq!(commands.first(), Some(&DrawCommand::Fill(BACKGROUND)));
        assert_eq!(
            commands.last(),
            Some(&DrawCommand::Text(layout.date_stamp.clone()))
        );
        let texts = commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Text(_)))
            .count();
        // header + 2 headings + 2 lines + date
        assert_eq!(texts, 6);
    }
}
