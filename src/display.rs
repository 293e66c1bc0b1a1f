//! `Display`
//!
//! A display composes one or more views into a single
//! coordinate space and keeps a cursor position along each
//! of its non-planar axes. Every method takes `&self`, so a
//! display can be shared between the code handling input and
//! the code rendering it.
//!
//! The views, the combined interval and the cursor positions
//! live behind one `RwLock`. A rebuild reads the views, swaps in
//! the new interval and brings the positions in line with it in
//! a single write, so readers never see an interval that
//! disagrees with the views or the positions. Events are
//! published only after that lock is released.

pub mod events;
pub mod interval;
pub mod position;

pub use events::{DisplayEvent, DisplayObserver, EventBus};
pub use interval::{BoundedRegion, CombinedInterval, IntervalError, ViewData};
pub use position::PositionTracker;

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::RwLock;

use crate::data::axis::AxisType;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DisplayError {
    #[error("Invalid combination of views: {0}")]
    StructuralInterval(#[from] IntervalError),

    #[error("Unknown axis: {0}")]
    UnknownAxis(AxisType),

    #[error("No view at index {index} (display has {count} views)")]
    NoSuchView { index : usize, count : usize },
}

/// An axis-aligned rectangle in calibrated coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RealRect {
    pub x : f64,
    pub y : f64,
    pub width : f64,
    pub height : f64,
}

/// One view of a display: the data shown and the position
/// the display last pushed into it (see `Display::update`).
#[derive(Clone)]
pub struct DataView {
    data : Arc<dyn ViewData>,
    positions : HashMap<AxisType, i64>,
}

impl DataView {
    pub fn new(data : Arc<dyn ViewData>) -> DataView {
        DataView { data, positions : HashMap::new() }
    }

    pub fn data(&self) -> &Arc<dyn ViewData> {
        &self.data
    }

    /// Position along `axis`, 0 until the display sets it.
    pub fn position(&self, axis : &AxisType) -> i64 {
        self.positions.get(axis).copied().unwrap_or(0)
    }
}

struct DisplayState {
    views : Vec<DataView>,
    interval : Arc<CombinedInterval>,
    tracker : PositionTracker,
}

impl DisplayState {
    /// Pushes the tracked positions into every view that has
    /// the corresponding axis.
    fn update_views(&mut self) {
        let positions = self.tracker.snapshot(&self.interval);
        for view in self.views.iter_mut() {
            for (axis, position) in positions.iter() {
                if view.data.axis_index(axis).is_some() {
                    view.positions.insert(axis.clone(), *position);
                }
            }
        }
    }
}

pub struct Display {
    name : RwLock<String>,
    bus : Arc<EventBus>,
    state : RwLock<DisplayState>,
}

impl Display {
    /// An empty display. If `name` is empty the display takes
    /// the name of the first view added to it.
    ///
    /// ## Arguments
    ///
    /// * `name` - Name used in the events this display publishes
    /// * `bus` - Where position and activation events are sent
    pub fn new(name : &str, bus : Arc<EventBus>) -> Display {
        Display {
            name : RwLock::new(name.to_string()),
            bus,
            state : RwLock::new(DisplayState {
                views : Vec::new(),
                interval : Arc::new(CombinedInterval::new()),
                tracker : PositionTracker::new(),
            }),
        }
    }

    /// A display showing all of `views`. Fails if their
    /// combined bounds aren't discrete.
    ///
    /// ## Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use axiscope::{Axis, AxisType::*, Dataset};
    /// use axiscope::display::{Display, EventBus, ViewData};
    ///
    /// let axes = [X, Y, Z].into_iter().map(Axis::new).collect();
    /// let dataset : Arc<dyn ViewData> = Arc::new(Dataset::zeros("stack", axes, &[4, 3, 10]).unwrap());
    /// let display = Display::with_views("", Arc::new(EventBus::new()), vec![dataset]).unwrap();
    ///
    /// assert_eq!(display.name(), "stack");
    /// assert_eq!(display.active_axis(), Some(Z));
    /// assert_eq!(display.set_position(&Z, 100).unwrap(), 9);
    /// assert_eq!(display.get_position(&Z), 9);
    /// ```
    pub fn with_views(name : &str, bus : Arc<EventBus>, views : Vec<Arc<dyn ViewData>>)
        -> Result<Display, DisplayError> {
        let display = Display::new(name, bus);
        if let Some(first) = views.first() {
            display.adopt_name(first.name());
        }
        display.state.write().views = views.into_iter().map(DataView::new).collect();
        display.rebuild()?;
        Ok(display)
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    fn adopt_name(&self, name : &str) {
        let mut current = self.name.write();
        if current.is_empty() {
            *current = name.to_string();
        }
    }

    /// Adds a view and rebuilds. If the new view can't be
    /// combined with the others it is removed again and the
    /// display is left as it was.
    ///
    /// ## Returns
    ///
    /// The index of the new view
    pub fn add_view(&self, data : Arc<dyn ViewData>) -> Result<usize, DisplayError> {
        self.adopt_name(data.name());
        let (index, activated) = {
            let mut state = self.state.write();
            state.views.push(DataView::new(data));
            match self.rebuild_locked(&mut state) {
                Ok(activated) => (state.views.len() - 1, activated),
                Err(err) => {
                    state.views.pop();
                    return Err(err);
                },
            }
        };
        self.publish_activation(activated);
        Ok(index)
    }

    pub fn view_count(&self) -> usize {
        self.state.read().views.len()
    }

    pub fn view(&self, index : usize) -> Option<DataView> {
        self.state.read().views.get(index).cloned()
    }

    /// The current combined interval.
    pub fn interval(&self) -> Arc<CombinedInterval> {
        self.state.read().interval.clone()
    }

    /// Recombines the views into a new interval and brings the
    /// cursor positions in line with it. If no axis is active
    /// the first non-planar axis is activated.
    ///
    /// A non-discrete combination is rejected and leaves the
    /// interval and positions as they were.
    pub fn rebuild(&self) -> Result<(), DisplayError> {
        let activated = self.rebuild_locked(&mut self.state.write())?;
        self.publish_activation(activated);
        Ok(())
    }

    /// Builds the interval from `state.views` and swaps it in.
    /// The caller holds the write lock for the whole of it.
    ///
    /// ## Returns
    ///
    /// The axis activated by the rebuild, if any
    fn rebuild_locked(&self, state : &mut DisplayState)
        -> Result<Option<AxisType>, DisplayError> {
        let mut interval = CombinedInterval::new();
        state.views.iter().for_each(|view| interval.add(view.data.clone()));
        interval.update();
        interval.validate().map_err(|err| {
            warn!("Invalid combination of views in {}: {}", self.name(), err);
            err
        })?;

        let activated = state.tracker.sync(&interval);
        state.interval = Arc::new(interval);
        debug!(
            "Rebuilt {}: {} axes, dims {:?}, tracking {} positions",
            self.name(),
            state.interval.num_dimensions(),
            state.interval.dims(),
            state.tracker.len(),
        );
        Ok(activated)
    }

    fn publish_activation(&self, activated : Option<AxisType>) {
        if let Some(axis) = activated {
            self.bus.publish(DisplayEvent::AxisActivated { display : self.name(), axis });
        }
    }

    /// Moves the cursor along `axis` to `value`, clamped into
    /// the axis bounds without complaint. Observers hear about
    /// it at the next `EventBus::flush`.
    ///
    /// X and Y have no cursor: the clamped value is returned
    /// but nothing is stored or published.
    ///
    /// ## Returns
    ///
    /// The position actually stored
    pub fn set_position(&self, axis : &AxisType, value : i64) -> Result<i64, DisplayError> {
        self.move_position(axis, |_| value)
    }

    /// Position along `axis`. Axes the display doesn't track
    /// are at 0.
    pub fn get_position(&self, axis : &AxisType) -> i64 {
        self.state.read().tracker.get(axis).unwrap_or(0)
    }

    /// Moves the cursor `delta` steps along `axis`.
    pub fn step(&self, axis : &AxisType, delta : i64) -> Result<i64, DisplayError> {
        self.move_position(axis, |current| current.saturating_add(delta))
    }

    /// Moves the cursor `delta` steps along the active axis,
    /// doing nothing if no axis is active.
    pub fn step_active(&self, delta : i64) -> Result<Option<i64>, DisplayError> {
        match self.active_axis() {
            Some(axis) => self.step(&axis, delta).map(Some),
            None => Ok(None),
        }
    }

    /// Read, clamp and store under one write lock, so concurrent
    /// steps don't lose updates.
    fn move_position<F>(&self, axis : &AxisType, to : F) -> Result<i64, DisplayError>
        where F : FnOnce(i64) -> i64 {
        let stored = {
            let mut state = self.state.write();
            let d = match state.interval.axis_index(axis) {
                Some(d) => d,
                None => {
                    warn!("{} has no {} axis", self.name(), axis);
                    return Err(DisplayError::UnknownAxis(axis.clone()));
                },
            };
            let (min, max) = (state.interval.min(d), state.interval.max(d));
            let requested = to(state.tracker.get(axis).unwrap_or(min));
            if axis.is_xy() {
                debug!("{} is planar, position {} not tracked", axis, requested);
                return Ok(requested.min(max).max(min));
            }
            let stored = state.tracker.set_clamped(axis, requested, min, max);
            if stored != requested {
                debug!("Clamped {} position {} to {}", axis, requested, stored);
            }
            stored
        };
        self.bus.publish_later(DisplayEvent::AxisPositionChanged {
            display : self.name(),
            axis : axis.clone(),
        });
        Ok(stored)
    }

    pub fn active_axis(&self) -> Option<AxisType> {
        self.state.read().tracker.active().cloned()
    }

    /// Makes `axis` the axis that navigation acts on and
    /// tells observers immediately.
    pub fn set_active_axis(&self, axis : &AxisType) -> Result<(), DisplayError> {
        if !self.state.write().tracker.set_active(axis) {
            warn!("Can't activate {} on {}: not a tracked axis", axis, self.name());
            return Err(DisplayError::UnknownAxis(axis.clone()));
        }
        self.bus.publish(DisplayEvent::AxisActivated {
            display : self.name(),
            axis : axis.clone(),
        });
        Ok(())
    }

    /// Every tracked axis with its position, in interval order.
    pub fn position_snapshot(&self) -> Vec<(AxisType, i64)> {
        let state = self.state.read();
        state.tracker.snapshot(&state.interval)
    }

    /// Pushes the display's positions into every view that
    /// has the corresponding axis.
    pub fn update(&self) {
        self.state.write().update_views();
    }

    /// Whether the current position lies within the view. Axes
    /// the view has must contain the position; axes it lacks must
    /// match the position the view was last given.
    pub fn is_visible(&self, view_index : usize) -> Result<bool, DisplayError> {
        let state = self.state.read();
        let view = state.views.get(view_index).ok_or(DisplayError::NoSuchView {
            index : view_index,
            count : state.views.len(),
        })?;
        Ok(state.tracker.snapshot(&state.interval).iter().all(|(axis, position)| {
            match view.data.axis_index(axis) {
                Some(d) => {
                    let value = *position as f64;
                    value >= view.data.real_min(d) && value <= view.data.real_max(d)
                },
                None => *position == view.position(axis),
            }
        }))
    }

    /// The X/Y extent of the display, or `None` if it lacks
    /// either planar axis.
    pub fn plane_extents(&self) -> Option<RealRect> {
        let interval = self.interval();
        let x = interval.axis_index(&AxisType::X)?;
        let y = interval.axis_index(&AxisType::Y)?;
        Some(RealRect {
            x : interval.real_min(x),
            y : interval.real_min(y),
            width : interval.real_max(x) - interval.real_min(x),
            height : interval.real_max(y) - interval.real_min(y),
        })
    }

    /// Swaps the data behind a view (e.g. after its dataset was
    /// reordered), then rebuilds and updates. On failure the old
    /// data is put back.
    pub fn restructure(&self, view_index : usize, data : Arc<dyn ViewData>)
        -> Result<(), DisplayError> {
        let activated = {
            let mut state = self.state.write();
            let count = state.views.len();
            let view = state.views.get_mut(view_index)
                .ok_or(DisplayError::NoSuchView { index : view_index, count })?;
            let previous = std::mem::replace(&mut view.data, data);
            let activated = match self.rebuild_locked(&mut state) {
                Ok(activated) => activated,
                Err(err) => {
                    state.views[view_index].data = previous;
                    return Err(err);
                },
            };
            state.update_views();
            activated
        };
        self.publish_activation(activated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use crate::data::{Axis, Dataset, AxisType::*};

    fn region(types : &[AxisType], bounds : &[(f64, f64)]) -> Arc<dyn ViewData> {
        Arc::new(BoundedRegion::new(
            "region",
            types.iter().cloned().map(Axis::new).collect(),
            bounds.to_vec(),
        ).unwrap())
    }

    fn dataset(name : &str, types : &[AxisType], dims : &[usize]) -> Arc<dyn ViewData> {
        Arc::new(Dataset::zeros(name, types.iter().cloned().map(Axis::new).collect(), dims).unwrap())
    }

    fn recorded_bus() -> (Arc<EventBus>, Arc<Mutex<Vec<DisplayEvent>>>) {
        let bus = Arc::new(EventBus::new());
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        bus.subscribe(Arc::new(move |event : &DisplayEvent| sink.lock().push(event.clone())));
        (bus, log)
    }

    #[test]
    fn positions_are_clamped() {
        let display = Display::with_views(
            "d",
            Arc::new(EventBus::new()),
            vec![region(&[X, Y, Z], &[(0.0, 9.0), (0.0, 9.0), (0.0, 9.0)])],
        ).unwrap();
        assert_eq!(display.set_position(&Z, 100).unwrap(), 9);
        assert_eq!(display.get_position(&Z), 9);
        assert_eq!(display.set_position(&Z, -5).unwrap(), 0);
        assert_eq!(display.get_position(&Z), 0);
    }

    #[test]
    fn unknown_axes() {
        let display = Display::with_views(
            "d",
            Arc::new(EventBus::new()),
            vec![dataset("a", &[X, Y, Z], &[2, 2, 5])],
        ).unwrap();
        assert_eq!(display.set_position(&Time, 1), Err(DisplayError::UnknownAxis(Time)));
        assert_eq!(display.get_position(&Time), 0);
        assert_eq!(display.set_active_axis(&Time), Err(DisplayError::UnknownAxis(Time)));
        assert_eq!(display.set_active_axis(&Y), Err(DisplayError::UnknownAxis(Y)));
    }

    #[test]
    fn position_events_are_deferred() {
        let (bus, log) = recorded_bus();
        let display = Display::with_views(
            "d",
            bus.clone(),
            vec![dataset("a", &[X, Y, Z, Time], &[2, 2, 5, 3])],
        ).unwrap();
        // activation is immediate
        assert_eq!(
            *log.lock(),
            vec![DisplayEvent::AxisActivated { display : "d".into(), axis : Z }]
        );
        log.lock().clear();

        display.set_position(&Z, 3).unwrap();
        display.set_position(&Time, 2).unwrap();
        assert!(log.lock().is_empty());
        assert_eq!(bus.flush(), 2);
        assert_eq!(*log.lock(), vec![
            DisplayEvent::AxisPositionChanged { display : "d".into(), axis : Z },
            DisplayEvent::AxisPositionChanged { display : "d".into(), axis : Time },
        ]);

        log.lock().clear();
        display.set_active_axis(&Time).unwrap();
        assert_eq!(
            *log.lock(),
            vec![DisplayEvent::AxisActivated { display : "d".into(), axis : Time }]
        );
    }

    #[test]
    fn stepping() {
        let display = Display::with_views(
            "d",
            Arc::new(EventBus::new()),
            vec![dataset("a", &[X, Y, Channel, Z], &[2, 2, 3, 5])],
        ).unwrap();
        assert_eq!(display.active_axis(), Some(Channel));
        assert_eq!(display.step_active(1).unwrap(), Some(1));
        assert_eq!(display.step_active(10).unwrap(), Some(2));
        assert_eq!(display.step(&Z, -1).unwrap(), 0);
        assert_eq!(display.step(&Z, 3).unwrap(), 3);
        assert_eq!(display.step(&Z, i64::MAX).unwrap(), 4);
        assert_eq!(display.position_snapshot(), vec![(Channel, 2), (Z, 4)]);

        let flat = Display::with_views(
            "flat",
            Arc::new(EventBus::new()),
            vec![dataset("a", &[X, Y], &[2, 2])],
        ).unwrap();
        assert_eq!(flat.step_active(1).unwrap(), None);
    }

    #[test]
    fn non_discrete_views_are_rejected() {
        let bus = Arc::new(EventBus::new());
        let err = Display::with_views(
            "d",
            bus.clone(),
            vec![region(&[X, Z], &[(0.0, 4.0), (0.5, 3.0)])],
        ).err();
        assert!(matches!(err, Some(DisplayError::StructuralInterval(_))));

        let display = Display::with_views("d", bus, vec![dataset("a", &[X, Z], &[5, 4])]).unwrap();
        assert!(matches!(
            display.add_view(region(&[Z], &[(0.0, 7.5)])),
            Err(DisplayError::StructuralInterval(_))
        ));
        assert_eq!(display.view_count(), 1);
        assert_eq!(display.interval().max(1), 3);

        // a fractional bound inside the integer union is fine
        assert_eq!(display.add_view(region(&[Z], &[(0.0, 2.5)])).unwrap(), 1);
        assert_eq!(display.interval().max(1), 3);
    }

    #[test]
    fn planar_positions_clamp_without_tracking() {
        let (bus, log) = recorded_bus();
        let display = Display::with_views(
            "d",
            bus.clone(),
            vec![dataset("a", &[X, Y, Z], &[4, 3, 5])],
        ).unwrap();
        log.lock().clear();

        assert_eq!(display.set_position(&X, 10).unwrap(), 3);
        assert_eq!(display.set_position(&Y, -2).unwrap(), 0);
        assert_eq!(display.step(&Y, 1).unwrap(), 1);
        assert_eq!(display.get_position(&X), 0);
        assert_eq!(display.position_snapshot(), vec![(Z, 0)]);
        assert_eq!(bus.flush(), 0);
        assert!(log.lock().is_empty());
    }

    /// A view that reports when its axes are first read, then
    /// takes a while to hand them over.
    struct SlowView {
        region : BoundedRegion,
        entered : Mutex<Option<std::sync::mpsc::Sender<()>>>,
    }

    impl ViewData for SlowView {
        fn name(&self) -> &str {
            self.region.name()
        }

        fn axes(&self) -> &[Axis] {
            if let Some(entered) = self.entered.lock().take() {
                entered.send(()).unwrap();
                std::thread::sleep(std::time::Duration::from_millis(50));
            }
            self.region.axes()
        }

        fn real_min(&self, d : usize) -> f64 {
            self.region.real_min(d)
        }

        fn real_max(&self, d : usize) -> f64 {
            self.region.real_max(d)
        }
    }

    #[test]
    fn concurrent_add_and_restructure_agree() {
        let display = Display::with_views(
            "d",
            Arc::new(EventBus::new()),
            vec![dataset("a", &[X, Y, Z], &[2, 2, 3])],
        ).unwrap();
        let (sender, entered) = std::sync::mpsc::channel();
        let slow : Arc<dyn ViewData> = Arc::new(SlowView {
            region : BoundedRegion::new(
                "slow",
                vec![Axis::new(X), Axis::new(Y)],
                vec![(0.0, 1.0), (0.0, 1.0)],
            ).unwrap(),
            entered : Mutex::new(Some(sender)),
        });

        std::thread::scope(|scope| {
            let adding = scope.spawn(|| display.add_view(slow));
            // the add is now mid-rebuild
            entered.recv().unwrap();
            display.restructure(0, dataset("a", &[X, Y, Z, Time], &[2, 2, 3, 4])).unwrap();
            assert_eq!(adding.join().unwrap().unwrap(), 1);
        });

        assert_eq!(display.view_count(), 2);
        assert_eq!(display.interval().dims(), vec![2, 2, 3, 4]);
        assert_eq!(display.set_position(&Time, 3).unwrap(), 3);
        assert_eq!(display.position_snapshot(), vec![(Z, 0), (Time, 3)]);
    }

    #[test]
    fn views_combine() {
        let display = Display::new("", Arc::new(EventBus::new()));
        display.add_view(dataset("first", &[X, Y, Z], &[10, 8, 5])).unwrap();
        assert_eq!(display.name(), "first");
        let overlay = display.add_view(region(&[X, Y, Z], &[(2.0, 4.0), (1.0, 3.0), (2.0, 9.0)])).unwrap();
        assert_eq!(overlay, 1);
        assert_eq!(display.interval().dims(), vec![10, 8, 10]);
        assert_eq!(
            display.plane_extents(),
            Some(RealRect { x : 0.0, y : 0.0, width : 9.0, height : 7.0 })
        );

        display.set_position(&Z, 7).unwrap();
        assert_eq!(display.is_visible(0).unwrap(), false);
        assert_eq!(display.is_visible(1).unwrap(), true);
        display.set_position(&Z, 1).unwrap();
        assert_eq!(display.is_visible(0).unwrap(), true);
        assert_eq!(display.is_visible(1).unwrap(), false);
        assert!(matches!(display.is_visible(2), Err(DisplayError::NoSuchView { index : 2, count : 2 })));
    }

    #[test]
    fn update_pushes_positions_into_views() {
        let display = Display::with_views(
            "d",
            Arc::new(EventBus::new()),
            vec![
                dataset("a", &[X, Y, Z, Time], &[2, 2, 5, 4]),
                dataset("b", &[X, Y, Z], &[2, 2, 5]),
            ],
        ).unwrap();
        display.set_position(&Z, 3).unwrap();
        display.set_position(&Time, 2).unwrap();
        display.update();

        let a = display.view(0).unwrap();
        let b = display.view(1).unwrap();
        assert_eq!((a.position(&Z), a.position(&Time)), (3, 2));
        assert_eq!((b.position(&Z), b.position(&Time)), (3, 0));
        // b has no Time axis and was never moved along it
        assert!(!display.is_visible(1).unwrap());
        display.set_position(&Time, 0).unwrap();
        assert!(display.is_visible(1).unwrap());
    }

    #[test]
    fn restructure_follows_the_data() {
        let (bus, log) = recorded_bus();
        let display = Display::with_views(
            "d",
            bus,
            vec![dataset("a", &[X, Y, Time, Z], &[2, 2, 3, 5])],
        ).unwrap();
        display.set_position(&Z, 4).unwrap();
        display.set_active_axis(&Z).unwrap();
        log.lock().clear();

        // Time dropped, Z shrunk, Channel added
        display.restructure(0, dataset("a", &[X, Y, Channel, Z], &[2, 2, 2, 3])).unwrap();
        assert_eq!(display.position_snapshot(), vec![(Channel, 0), (Z, 2)]);
        assert_eq!(display.active_axis(), Some(Z));
        assert!(log.lock().is_empty());
        assert_eq!(display.view(0).unwrap().position(&Z), 2);

        assert!(display.restructure(0, region(&[Z], &[(0.0, 0.5)])).is_err());
        assert_eq!(display.view(0).unwrap().data().name(), "a");
        assert!(matches!(
            display.restructure(3, dataset("a", &[X], &[1])),
            Err(DisplayError::NoSuchView { index : 3, count : 1 })
        ));
    }
}
