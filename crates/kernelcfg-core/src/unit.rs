/// Number of lanes in a work-group along each axis.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeDim {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CubeDim {
    /// A one-dimensional work-group of `x` lanes.
    pub fn new_1d(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    pub fn num_elems(&self) -> u32 {
        self.x * self.y * self.z
    }

    /// Every lane of a work-group, in linear order.
    pub fn units(&self, group: u32) -> impl Iterator<Item = UnitPos> + use<> {
        let dim = *self;

        (0..dim.num_elems()).map(move |linear| UnitPos {
            local: [
                linear % dim.x,
                (linear / dim.x) % dim.y,
                linear / (dim.x * dim.y),
            ],
            group,
        })
    }
}

impl Default for CubeDim {
    fn default() -> Self {
        Self::new_1d(1)
    }
}

/// Position of a lane: its local index in the work-group on each axis and the group index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct UnitPos {
    pub local: [u32; 3],
    pub group: u32,
}

impl UnitPos {
    /// The lane at `local` on the first axis of group 0.
    pub fn lane(local: u32) -> Self {
        Self {
            local: [local, 0, 0],
            group: 0,
        }
    }

    /// The local index on `axis`, like `get_local_id(axis)`.
    pub fn local_id(&self, axis: usize) -> u32 {
        self.local.get(axis).copied().unwrap_or(0)
    }

    /// Whether this is the lane designated for side effects shared by the whole group.
    pub fn is_leader(&self) -> bool {
        self.local_id(0) == 0
    }
}

/// Runs `body` once per lane of one work-group, sequentially, on the host.
///
/// This mirrors a kernel launch closely enough to exercise code that depends on the lane
/// position, such as [print_array](crate::debug::print_array). Lanes don't synchronize.
pub fn launch_group<F>(dim: CubeDim, group: u32, mut body: F)
where
    F: FnMut(UnitPos),
{
    log::debug!("Running {} lanes of group {group} on the host", dim.num_elems());

    for unit in dim.units(group) {
        body(unit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_cover_the_group() {
        let dim = CubeDim::new(2, 2, 2);
        let units = dim.units(3).collect::<Vec<_>>();

        assert_eq!(units.len(), 8);
        assert_eq!(units[0].local, [0, 0, 0]);
        assert_eq!(units[1].local, [1, 0, 0]);
        assert_eq!(units[2].local, [0, 1, 0]);
        assert_eq!(units[7].local, [1, 1, 1]);
        assert!(units.iter().all(|unit| unit.group == 3));
    }

    #[test]
    fn leader_is_local_zero_on_first_axis() {
        let leaders = CubeDim::new(4, 2, 1)
            .units(0)
            .filter(UnitPos::is_leader)
            .count();

        // One leader per row of the first axis, exactly like `get_local_id(0) == 0`.
        assert_eq!(leaders, 2);
        assert!(UnitPos::lane(0).is_leader());
        assert!(!UnitPos::lane(1).is_leader());
    }

    #[test]
    fn launch_visits_every_lane_once() {
        let mut visited = Vec::new();

        launch_group(CubeDim::new_1d(5), 0, |unit| visited.push(unit.local_id(0)));

        assert_eq!(visited, vec![0, 1, 2, 3, 4]);
    }
}
