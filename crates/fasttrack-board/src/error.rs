/// Errors that can occur while building or querying the board graph.
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    /// A cell count came out wrong during construction. Indicates a bug
    /// in the layout tables, not bad caller input.
    #[error("layout produced {got} {kind} cells, expected {expected}")]
    CellCount {
        /// Human-readable kind name.
        kind: &'static str,
        /// How many cells were produced.
        got: usize,
        /// How many the layout requires.
        expected: usize,
    },

    /// Two cells were assigned the same id.
    #[error("duplicate position id {0}")]
    DuplicateId(u16),

    /// A zone table points at a cell of the wrong kind or owner.
    #[error("zone table for seat {seat} is inconsistent: {detail}")]
    ZoneMismatch {
        /// The seat whose table failed validation.
        seat: u8,
        /// What was wrong.
        detail: String,
    },
}
