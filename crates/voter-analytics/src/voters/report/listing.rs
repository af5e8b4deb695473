use super::super::domain::VoterRecord;
use super::views::VoterPage;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error("page must be a positive integer, got '{0}'")]
    InvalidPage(String),
    #[error("page {page} is out of range (last page is {total_pages})")]
    OutOfRange { page: usize, total_pages: usize },
}

/// Page requested by a caller, either by number or as the final page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    Number(usize),
    Last,
}

impl PageSelector {
    pub fn resolve(self, total_pages: usize) -> usize {
        match self {
            Self::Number(page) => page,
            Self::Last => total_pages,
        }
    }
}

impl From<usize> for PageSelector {
    fn from(page: usize) -> Self {
        Self::Number(page)
    }
}

/// Parses a 1-based page parameter. A missing or empty value means the first
/// page and `last` means the final one.
pub fn parse_page(raw: Option<&str>) -> Result<PageSelector, PageError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(PageSelector::Number(1)),
        Some("last") => Ok(PageSelector::Last),
        Some(value) => value
            .parse::<usize>()
            .ok()
            .filter(|page| *page > 0)
            .map(PageSelector::Number)
            .ok_or_else(|| PageError::InvalidPage(value.to_string())),
    }
}

/// Sorts voters by `(last_name, first_name)` and slices out one page.
///
/// The first page of an empty set is valid and empty; any other page past the
/// end is out of range.
pub fn paginate(
    mut voters: Vec<VoterRecord>,
    page: PageSelector,
    page_size: usize,
) -> Result<VoterPage, PageError> {
    let page_size = page_size.max(1);
    let total_records = voters.len();
    let total_pages = total_records.div_ceil(page_size).max(1);
    let page = page.resolve(total_pages);

    if page == 0 || page > total_pages {
        return Err(PageError::OutOfRange { page, total_pages });
    }

    voters.sort_by(|left, right| {
        left.last_name
            .cmp(&right.last_name)
            .then_with(|| left.first_name.cmp(&right.first_name))
            .then_with(|| left.id.cmp(&right.id))
    });

    let start = (page - 1) * page_size;
    let voters: Vec<VoterRecord> = voters.into_iter().skip(start).take(page_size).collect();

    Ok(VoterPage {
        voters,
        page,
        page_size,
        total_records,
        total_pages,
        has_next: page < total_pages,
        has_previous: page > 1,
    })
}
