use coin_track_core::TrackError;

/// Number of integers expected before the grid rows.
const HEADER_FIELDS: usize = 3;

/// Puzzle description read from the textual input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Puzzle {
    /// Number of grid rows announced by the header.
    pub(crate) rows: i64,
    /// Number of grid columns announced by the header.
    pub(crate) columns: i64,
    /// Number of iterations the coin should take to rest.
    pub(crate) target: i64,
    /// Raw row text following the header, one entry per line.
    pub(crate) lines: Vec<String>,
}

impl Puzzle {
    /// Parses the header integers followed by the grid rows.
    ///
    /// The header is read as whitespace-separated integers that may span
    /// several lines; whatever follows the third integer on its line is
    /// discarded and the next line holds the first grid row.
    pub(crate) fn parse(text: &str) -> Result<Self, TrackError> {
        let mut header = Vec::with_capacity(HEADER_FIELDS);
        let mut lines = text.lines();

        while header.len() < HEADER_FIELDS {
            let Some(line) = lines.next() else {
                log::warn!("input ended after {} header fields", header.len());
                return Err(invalid_header(&header));
            };

            for token in line.split_whitespace().take(HEADER_FIELDS - header.len()) {
                let value = token.parse::<i64>().map_err(|_| {
                    log::warn!("header field '{token}' is not an integer");
                    invalid_header(&header)
                })?;
                header.push(value);
            }
        }

        let lines = lines
            .map(|line| line.trim_end_matches('\r').to_owned())
            .collect();

        Ok(Self {
            rows: header[0],
            columns: header[1],
            target: header[2],
            lines,
        })
    }

    /// Text of the requested row, or an empty row when the input ran short.
    pub(crate) fn row(&self, index: usize) -> &str {
        self.lines.get(index).map_or("", String::as_str)
    }
}

fn invalid_header(parsed: &[i64]) -> TrackError {
    TrackError::InvalidDimensions {
        columns: parsed.get(1).copied().unwrap_or(0),
        rows: parsed.first().copied().unwrap_or(0),
    }
}
