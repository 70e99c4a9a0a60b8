use crate::table::SortColumn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    Navigate(Direction),
    Terminate(u32),
    EnterSearchMode,
    SubmitSearch,
    CancelSearch,
    UpdateSearch(String),
    SortBy(SortColumn),
    CycleSort,
    ToggleColumns,
    CycleTheme,
    ToggleHelp,
    None,
}
