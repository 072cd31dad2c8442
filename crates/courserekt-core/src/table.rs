/// Read-only view of the filterable table.
///
/// Body cells are addressed as one flat sequence in document order, which is
/// how the page exposes them. With header/body cell-count parity the cell in
/// body row `r`, column `c` sits at `c + r * header_width`.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct TableSnapshot {
  pub header_width:    usize,
  pub body_cell_count: usize,
  /// Key cell text per body row; `None` when the row has no cell at the key
  /// position.
  pub rows:            Vec<Option<String>>
}

impl TableSnapshot {
  /// Flat body-cell addresses of `column`, bounded by the cells that exist.
  /// Empty when the header has no cells or `column` is out of range.
  pub fn column_cells(
    &self,
    column: usize
  ) -> impl Iterator<Item = usize> + '_ {
    let width = self.header_width;
    let in_range =
      width > 0 && column < width;
    let count = if in_range {
      self.body_cell_count
    } else {
      0
    };

    (column..count).step_by(width.max(1))
  }
}
