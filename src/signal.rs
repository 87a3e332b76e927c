//! Latest-value signal cells connecting independently scheduled systems.
//!
//! An `Emitter` fans out to any number of cells, one per connection, each
//! read by exactly one `Receiver`. A write overwrites the cell (latest-value,
//! not queued): a slow reader may miss intermediate values but always sees
//! monotonically newer ones, and can never stall the writer or another
//! reader. Reads never block; "nothing fresh" is `None`, not an error.

use std::sync::{Arc, Mutex};

use crate::world::WorldClock;

/// A payload stamped with nanoseconds since the world epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Message<T> {
    pub data: T,
    pub ts_ns: u64,
}

struct CellState<T> {
    seq: u64,
    latest: Option<Message<T>>,
}

/// Single-writer cell shared by one connection.
pub(crate) struct Cell<T> {
    state: Mutex<CellState<T>>,
}

impl<T: Clone> Cell<T> {
    fn new() -> Cell<T> {
        Cell {
            state: Mutex::new(CellState { seq: 0, latest: None }),
        }
    }

    fn write(&self, data: T, ts_ns: u64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.seq += 1;
        state.latest = Some(Message { data, ts_ns });
    }

    fn load(&self) -> (u64, Option<Message<T>>) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        (state.seq, state.latest.clone())
    }
}

/// One connection out of an emitter: forwards a value into a cell, applying
/// the edge's transform on the way.
trait Edge<T>: Send {
    fn forward(&self, value: &T, ts_ns: u64);
}

struct DirectEdge<T> {
    cell: Arc<Cell<T>>,
}

impl<T: Clone + Send> Edge<T> for DirectEdge<T> {
    fn forward(&self, value: &T, ts_ns: u64) {
        self.cell.write(value.clone(), ts_ns);
    }
}

struct MapEdge<T, U> {
    map: Box<dyn Fn(&T) -> U + Send + Sync>,
    cell: Arc<Cell<U>>,
}

impl<T: Send, U: Clone + Send> Edge<T> for MapEdge<T, U> {
    fn forward(&self, value: &T, ts_ns: u64) {
        self.cell.write((self.map)(value), ts_ns);
    }
}

/// Named output port of a control system. Starts disconnected (emits are
/// dropped); `World::connect*` attaches edges at assembly time. An emitter
/// that nothing consumes is the first-class null sink on the output side.
pub struct Emitter<T> {
    edges: Vec<Box<dyn Edge<T>>>,
    clock: Option<Arc<WorldClock>>,
}

impl<T> Default for Emitter<T> {
    fn default() -> Emitter<T> {
        Emitter {
            edges: Vec::new(),
            clock: None,
        }
    }
}

impl<T: Send + 'static> Emitter<T> {
    pub fn new() -> Emitter<T> {
        Emitter::default()
    }

    /// Stamp and fan the value out to every connected cell.
    pub fn emit(&self, value: T) {
        let Some(clock) = &self.clock else { return };
        let ts_ns = clock.now_ns();
        for edge in &self.edges {
            edge.forward(&value, ts_ns);
        }
    }

    /// Number of connections wired out of this port.
    pub fn fan_out(&self) -> usize {
        self.edges.len()
    }

    fn attach(&mut self, clock: Arc<WorldClock>) -> &mut Vec<Box<dyn Edge<T>>> {
        self.clock.get_or_insert(clock);
        &mut self.edges
    }

    pub(crate) fn add_direct(&mut self, clock: Arc<WorldClock>, cell: Arc<Cell<T>>)
    where
        T: Clone,
    {
        self.attach(clock).push(Box::new(DirectEdge { cell }));
    }

    pub(crate) fn add_mapped<U, F>(&mut self, clock: Arc<WorldClock>, cell: Arc<Cell<U>>, map: F)
    where
        U: Clone + Send + 'static,
        F: Fn(&T) -> U + Send + Sync + 'static,
    {
        self.attach(clock).push(Box::new(MapEdge {
            map: Box::new(map),
            cell,
        }));
    }
}

/// Named input port of a control system. Each receiver has its own freshness
/// cursor, so consumers of a broadcast never interfere with each other.
pub struct Receiver<T> {
    cell: Option<Arc<Cell<T>>>,
    last_seen: u64,
    sink: bool,
}

impl<T> Default for Receiver<T> {
    fn default() -> Receiver<T> {
        Receiver {
            cell: None,
            last_seen: 0,
            sink: false,
        }
    }
}

impl<T: Clone> Receiver<T> {
    /// A regular port, unwired until assembly. Reading an unwired port
    /// yields `None` forever.
    pub fn new() -> Receiver<T> {
        Receiver::default()
    }

    /// A declared-absent consumer. Sinks are filtered out of connection
    /// lists once at graph-build time, never checked at dispatch time.
    pub fn sink() -> Receiver<T> {
        Receiver {
            sink: true,
            ..Receiver::default()
        }
    }

    pub fn is_sink(&self) -> bool {
        self.sink
    }

    /// The latest value not yet seen by this receiver, or `None` when
    /// nothing new arrived since the last `read`.
    pub fn read(&mut self) -> Option<Message<T>> {
        let cell = self.cell.as_ref()?;
        let (seq, latest) = cell.load();
        if seq == self.last_seen {
            return None;
        }
        self.last_seen = seq;
        latest
    }

    /// The latest value regardless of whether it was already seen. Does not
    /// advance the freshness cursor.
    pub fn latest(&self) -> Option<Message<T>> {
        let cell = self.cell.as_ref()?;
        cell.load().1
    }

    pub(crate) fn bind(&mut self) -> Arc<Cell<T>> {
        if self.cell.is_some() {
            log::warn!("receiver already wired; replacing its source");
            self.last_seen = 0;
        }
        let cell = Arc::new(Cell::new());
        self.cell = Some(cell.clone());
        cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    #[test]
    fn test_unwired_ports_are_inert() {
        let tx: Emitter<u32> = Emitter::new();
        tx.emit(7); // dropped, nobody listens
        assert_eq!(tx.fan_out(), 0);

        let mut rx: Receiver<u32> = Receiver::new();
        assert!(rx.read().is_none());
        assert!(rx.latest().is_none());
    }

    #[test]
    fn test_read_is_fresh_or_none() {
        let mut world = World::new();
        let mut tx = Emitter::new();
        let mut rx = Receiver::new();
        world.connect(&mut tx, &mut rx);

        assert!(rx.read().is_none());
        tx.emit(1u32);
        assert_eq!(rx.read().map(|m| m.data), Some(1));
        assert!(rx.read().is_none());

        // latest() keeps returning the value without consuming freshness.
        assert_eq!(rx.latest().map(|m| m.data), Some(1));
        assert!(rx.read().is_none());
    }

    #[test]
    fn test_latest_value_overwrite() {
        let mut world = World::new();
        let mut tx = Emitter::new();
        let mut rx = Receiver::new();
        world.connect(&mut tx, &mut rx);

        tx.emit(1u32);
        tx.emit(2u32);
        tx.emit(3u32);
        // The slow reader misses 1 and 2 and sees only the newest value.
        assert_eq!(rx.read().map(|m| m.data), Some(3));
        assert!(rx.read().is_none());
    }

    #[test]
    fn test_broadcast_receivers_are_independent() {
        let mut world = World::new();
        let mut tx = Emitter::new();
        let mut a = Receiver::new();
        let mut b = Receiver::new();
        let mut c = Receiver::new();
        world
            .connect_broadcast("payload", &mut tx, vec![&mut a, &mut b, &mut c])
            .unwrap();

        tx.emit(10u32);
        assert_eq!(a.read().map(|m| m.data), Some(10));
        assert_eq!(b.read().map(|m| m.data), Some(10));
        assert_eq!(c.read().map(|m| m.data), Some(10));

        // b and c never consumed the second emission before the third; they
        // still observe the newest one, a already consumed it.
        tx.emit(11u32);
        assert_eq!(a.read().map(|m| m.data), Some(11));
        tx.emit(12u32);
        assert_eq!(a.read().map(|m| m.data), Some(12));
        assert_eq!(b.read().map(|m| m.data), Some(12));
        assert_eq!(c.read().map(|m| m.data), Some(12));
    }

    #[test]
    fn test_mapped_edge_transforms_in_transit() {
        let mut world = World::new();
        let mut tx = Emitter::new();
        let mut raw = Receiver::new();
        let mut doubled = Receiver::new();
        world.connect(&mut tx, &mut raw);
        world.connect_map(&mut tx, &mut doubled, |v: &u32| v * 2);

        tx.emit(21u32);
        assert_eq!(raw.read().map(|m| m.data), Some(21));
        assert_eq!(doubled.read().map(|m| m.data), Some(42));
    }

    #[test]
    fn test_sink_is_filtered_at_build_time() {
        let mut world = World::new();
        let mut tx = Emitter::new();
        let mut rx = Receiver::<u32>::sink();
        world.connect(&mut tx, &mut rx);
        assert_eq!(tx.fan_out(), 0);
        tx.emit(5);
        assert!(rx.read().is_none());
    }

    #[test]
    fn test_timestamps_are_monotonic() {
        let mut world = World::new();
        let mut tx = Emitter::new();
        let mut rx = Receiver::new();
        world.connect(&mut tx, &mut rx);

        tx.emit(1u32);
        let first = rx.read().unwrap().ts_ns;
        tx.emit(2u32);
        let second = rx.read().unwrap().ts_ns;
        assert!(second >= first);
    }
}
