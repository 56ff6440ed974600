//! Ownership of derived graph state across disassembly loads.
//!
//! A session tracks the active contract address and everything derived from
//! its disassembly. Each load is identified by a [`LoadTicket`]; a result that
//! arrives for a ticket other than the latest one is discarded, so a slow
//! response for a previous address never overwrites newer state. Derived
//! state is always replaced as a whole.

use serde::Serialize;

use crate::format::BlockListing;
use crate::graph::{
    build_graph, FilteredGraph, FunctionDict, GraphFilter, GraphModel, GraphResult, TypeCounts,
};
use crate::model::{Block, DisassemblyResponse};

/// Identifies one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result was installed as the current derived state.
    Applied,
    /// A newer load superseded this one; nothing changed.
    Stale,
}

/// Everything derived from one disassembly response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedGraph {
    pub functions: FunctionDict,
    pub graph: GraphModel,
    #[serde(skip)]
    pub response: DisassemblyResponse,
}

impl DerivedGraph {
    /// Assign function colors and build the graph for `response`.
    pub fn from_response(response: DisassemblyResponse) -> GraphResult<Self> {
        let functions = FunctionDict::from_functions(&response.functions);
        let graph = build_graph(&response.blocks, &response.links, &functions)?;
        Ok(Self { functions, graph, response })
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.response.block(index)
    }
}

/// Load status shown next to the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug)]
pub struct InspectorSession {
    address: Option<String>,
    generation: u64,
    status: LoadStatus,
    derived: Option<DerivedGraph>,
    filter: GraphFilter,
    show_only_filtered: bool,
    selected_block: Option<usize>,
}

impl Default for InspectorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl InspectorSession {
    pub fn new() -> Self {
        Self {
            address: None,
            generation: 0,
            status: LoadStatus::Idle,
            derived: None,
            filter: GraphFilter::all(),
            show_only_filtered: false,
            selected_block: None,
        }
    }

    /// Start loading `address`.
    ///
    /// Derived state, filter and selection of the previous address are
    /// cleared right away; any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self, address: impl Into<String>) -> LoadTicket {
        self.generation += 1;
        self.address = Some(address.into());
        self.status = LoadStatus::Loading;
        self.derived = None;
        self.filter = GraphFilter::all();
        self.show_only_filtered = false;
        self.selected_block = None;
        LoadTicket(self.generation)
    }

    fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Install the result of `ticket` if it is still the latest load.
    ///
    /// A graph construction error is returned to the caller and recorded as
    /// the load status; the previous (already cleared) state stays empty.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        response: DisassemblyResponse,
    ) -> GraphResult<LoadOutcome> {
        if !self.is_current(ticket) {
            log::warn!(
                "discarding stale disassembly result (ticket {}, current {})",
                ticket.0,
                self.generation
            );
            return Ok(LoadOutcome::Stale);
        }

        match DerivedGraph::from_response(response) {
            Ok(derived) => {
                self.derived = Some(derived);
                self.status = LoadStatus::Ready;
                Ok(LoadOutcome::Applied)
            }
            Err(err) => {
                self.status = LoadStatus::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Record a failed fetch for `ticket`.
    pub fn fail_load(&mut self, ticket: LoadTicket, message: impl Into<String>) -> LoadOutcome {
        if !self.is_current(ticket) {
            log::warn!("ignoring failure of stale load (ticket {})", ticket.0);
            return LoadOutcome::Stale;
        }
        self.status = LoadStatus::Failed(message.into());
        LoadOutcome::Applied
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn derived(&self) -> Option<&DerivedGraph> {
        self.derived.as_ref()
    }

    pub fn filter(&self) -> &GraphFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: GraphFilter) {
        self.filter = filter;
    }

    pub fn show_only_filtered(&self) -> bool {
        self.show_only_filtered
    }

    pub fn set_show_only_filtered(&mut self, value: bool) {
        self.show_only_filtered = value;
    }

    /// Select a block by index; returns `false` when no such block exists.
    pub fn select_block(&mut self, index: usize) -> bool {
        let exists = self.derived.as_ref().is_some_and(|derived| derived.block(index).is_some());
        if exists {
            self.selected_block = Some(index);
        }
        exists
    }

    pub fn clear_selection(&mut self) {
        self.selected_block = None;
    }

    pub fn selected_block(&self) -> Option<&Block> {
        let index = self.selected_block?;
        self.derived.as_ref()?.block(index)
    }

    /// Detail listing of the selected block.
    pub fn selected_listing(&self) -> Option<BlockListing> {
        self.selected_block().map(BlockListing::from_block)
    }

    /// Histogram for the filter controls, restricted to the function filter.
    pub fn type_counts(&self) -> Option<TypeCounts> {
        self.derived.as_ref().map(|derived| derived.graph.type_counts_for(&self.filter))
    }

    /// The graph as currently displayed.
    pub fn view(&self) -> Option<FilteredGraph> {
        self.derived
            .as_ref()
            .map(|derived| derived.graph.apply_filter(&self.filter, self.show_only_filtered))
    }
}
