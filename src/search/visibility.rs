//! Заливка области видимости.

use crate::grid::HexGrid;
use crate::search::SearchError;

/// Возвращает все ячейки, видимые из `from` на дальность `range`.
///
/// Каждая клетка стоит 1. Сосед достижим, только если `distance + 1` вместе с его
/// высотой обзора не выходит за дальность (увеличенную на высоту обзора источника),
/// и если `distance + 1` не больше прямого гексагонального расстояния от источника:
/// обходной путь не позволяет «заглянуть» за возвышенность.
/// Ячейки без признака `explorable` не просматриваются.
pub fn visible_cells(grid: &mut HexGrid, from: usize, range: i32) -> Result<Vec<usize>, SearchError> {
    if from >= grid.cell_count() {
        return Err(SearchError::CellOutOfRange(from));
    }
    let range = range + grid.cells()[from].view_elevation();

    let mut visible = Vec::new();
    let mut session = grid.begin_search()?;
    session.open(from, 0, 0, None);

    while let Some(current) = session.settle_next() {
        visible.push(current);
        let distance = session.state(current).distance + 1;

        let neighbors: Vec<_> = session.grid().neighbors(current).map(|(_, n)| n).collect();
        for neighbor in neighbors {
            if session.is_settled(neighbor) {
                continue;
            }
            let cell = &session.grid().cells()[neighbor];
            if !cell.is_explorable()
                || distance + cell.view_elevation() > range
                || distance > session.grid().distance(from, neighbor)
            {
                continue;
            }
            if session.is_unvisited(neighbor) {
                session.open(neighbor, distance, 0, None);
            } else {
                session.relax(neighbor, distance, None);
            }
        }
    }
    Ok(visible)
}

/// Увеличивает счётчики видимости ячеек в радиусе обзора и отмечает их исследованными.
pub fn increase_visibility(grid: &mut HexGrid, from: usize, range: i32) -> Result<(), SearchError> {
    for index in visible_cells(grid, from, range)? {
        let cell = grid.cell_mut(index);
        cell.visibility += 1;
        cell.explored = true;
        grid.mark_dirty(index);
    }
    Ok(())
}

pub fn decrease_visibility(grid: &mut HexGrid, from: usize, range: i32) -> Result<(), SearchError> {
    for index in visible_cells(grid, from, range)? {
        let cell = grid.cell_mut(index);
        cell.visibility = cell.visibility.saturating_sub(1);
        grid.mark_dirty(index);
    }
    Ok(())
}
