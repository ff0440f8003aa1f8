pub mod history;

pub use history::{
    export_history, load_history, CellRecord, CellTable, HistoryError, HistoryFormat,
    SimulationHistory, Snapshot,
};
