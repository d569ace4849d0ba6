//! The proposals tracked by the monitor.

use crate::ProposalSeed;

const fn s(kind: &'static str, number: u32, year: u16) -> ProposalSeed {
    ProposalSeed::new(kind, number, year)
}

/// Proposals followed in the Chamber of Deputies.
pub const TRACKED_SEEDS: &[ProposalSeed] = &[
    s("PL", 5531, 2020),
    s("PL", 5861, 2023),
    s("PL", 4154, 2019),
    s("PL", 4522, 2021),
    s("PL", 2408, 2023),
    s("PL", 2941, 2023),
    s("PL", 2133, 2023),
    s("PL", 1032, 2023),
    s("PL", 2987, 2023),
    s("PLP", 143, 2020),
    s("PL", 4435, 2021),
    s("PL", 3127, 2023),
    s("PL", 3457, 2023),
    s("PL", 3433, 2021),
    s("PL", 6093, 2023),
    s("PL", 2414, 2023),
    s("PL", 7938, 2017),
    s("PL", 285, 2015),
    s("PL", 3105, 2020),
    s("PL", 5277, 2023),
    s("PL", 1496, 2023),
    s("PL", 2857, 2022),
    s("PL", 2910, 2023),
    s("PL", 4423, 2016),
    s("PL", 2413, 2023),
    s("PL", 578, 2023),
    s("PL", 3928, 2012),
    s("PL", 4518, 2021),
    s("PL", 2521, 2015),
    s("PL", 3226, 2023),
    s("PL", 10147, 2018),
    s("PL", 4977, 2016),
    s("PL", 3165, 2015),
    s("PL", 4907, 2019),
    s("PL", 4049, 2023),
    s("PDL", 334, 2023),
    s("PL", 484, 2022),
    s("PL", 97, 2023),
    s("PLP", 101, 2022),
    s("PL", 3876, 2015),
    s("PLP", 79, 2022),
    s("PLP", 191, 2019),
    s("PL", 3636, 2015),
    s("PL", 9163, 2017),
    s("PL", 2678, 2022),
    s("PL", 561, 2022),
    s("PL", 3394, 2015),
    s("PL", 1202, 2007),
    s("REQ", 90, 2023),
];
