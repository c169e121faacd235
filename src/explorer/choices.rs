use crate::models::{Page, Playlist, Video};
use thiserror::Error;

pub const PREVIOUS_PAGE: &str = "[Previous Page]";
pub const NEXT_PAGE: &str = "[Next Page]";
pub const RANGE: &str = "[Range]";
pub const ALL_VIDEOS: &str = "[ALL VIDEOS]";

/// Anything listed by title on a paged screen
pub trait Titled {
    fn title(&self) -> &str;
}

impl Titled for Playlist {
    fn title(&self) -> &str {
        &self.title
    }
}

impl Titled for Video {
    fn title(&self) -> &str {
        &self.title
    }
}

/// An entry on a paged screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageChoice {
    PreviousPage,
    NextPage,
    /// Index into the page's items
    Item(usize),
}

impl PageChoice {
    pub fn label<'a, T: Titled>(&self, page: &'a Page<T>) -> &'a str {
        match self {
            PageChoice::PreviousPage => PREVIOUS_PAGE,
            PageChoice::NextPage => NEXT_PAGE,
            PageChoice::Item(i) => page.items.get(*i).map(Titled::title).unwrap_or_default(),
        }
    }
}

/// An entry on the video screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoChoice {
    Range,
    AllVideos,
    Page(PageChoice),
}

impl VideoChoice {
    pub fn label<'a>(&self, page: &'a Page<Video>) -> &'a str {
        match self {
            VideoChoice::Range => RANGE,
            VideoChoice::AllVideos => ALL_VIDEOS,
            VideoChoice::Page(choice) => choice.label(page),
        }
    }
}

/// `[Previous Page]? + items + [Next Page]?`
pub fn page_choices<T>(page: &Page<T>) -> Vec<PageChoice> {
    let mut choices = Vec::with_capacity(page.items.len() + 2);
    if page.has_prev() {
        choices.push(PageChoice::PreviousPage);
    }
    choices.extend((0..page.items.len()).map(PageChoice::Item));
    if page.has_next() {
        choices.push(PageChoice::NextPage);
    }
    choices
}

/// `[Range] + [ALL VIDEOS] + ` the page choices
pub fn video_choices(page: &Page<Video>) -> Vec<VideoChoice> {
    [VideoChoice::Range, VideoChoice::AllVideos]
        .into_iter()
        .chain(page_choices(page).into_iter().map(VideoChoice::Page))
        .collect()
}

/// Problems with a typed `start,count` range
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeInputError {
    #[error("Expected two numbers separated by a comma, e.g. 1,10")]
    Malformed,

    #[error("The count must be at least 1")]
    EmptyRange,
}

/// Parse `start,count` as typed by the user
pub fn parse_range_input(input: &str) -> Result<(i64, i64), RangeInputError> {
    let mut parts = input.split(',').map(str::trim);
    let (Some(start), Some(count), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(RangeInputError::Malformed);
    };

    let start: i64 = start.parse().map_err(|_| RangeInputError::Malformed)?;
    let count: i64 = count.parse().map_err(|_| RangeInputError::Malformed)?;
    if count < 1 {
        return Err(RangeInputError::EmptyRange);
    }
    Ok((start, count))
}

/// Clamp a requested range against a collection of `total` items.
///
/// `count` is capped at `total` and `start` is kept within `1..=total`. Both
/// results are at least 1.
pub fn clamp_range(start: i64, count: i64, total: u32) -> (u32, u32) {
    let last = i64::from(total.max(1));
    let count = count.clamp(1, last);
    let start = start.clamp(1, last);
    (start as u32, count as u32)
}
