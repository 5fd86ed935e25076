//! BD-Rate tie-break between near-equivalent ladder candidates.
//!
//! Two situations make a hull rung ambiguous:
//!
//! - several samples sit at (almost) the same rate-quality position as a hull
//!   vertex, within [`LadderOptions`] epsilons;
//! - a Pareto survivor lies exactly on a hull segment, so the straight-line
//!   trade-off could belong to it or to the segment endpoint.
//!
//! Each ambiguous rung becomes a contest. The incumbent (the hull vertex) is
//! compared against every challenger in table order by building a local
//! rate-quality curve for both (the candidate plus the neighbouring rungs)
//! and taking the BD-Rate between them. When the local curves share no
//! quality interval, plain dominance decides, and failing that the earlier
//! sample in table order is kept and an [`UnresolvedTie`] is recorded.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{HullPoint, LadderOptions, ParetoFront, is_collinear};
use crate::stats::bd_rate;
use crate::table::RdTable;

/// BD-Rate magnitude (percent) below which two curves count as equivalent.
const EQUIVALENT_BD_RATE: f64 = 1e-9;

/// Non-fatal diagnostic: a tie that neither BD-Rate nor dominance could
/// settle. The earlier sample in table order was kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedTie {
    /// Id of the sample kept on the ladder.
    pub kept: String,
    /// Id of the sample dropped from the ladder.
    pub dropped: String,
}

impl fmt::Display for UnresolvedTie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unresolved tie between '{}' and '{}': no common quality range and no dominance, kept '{}' by table order",
            self.kept, self.dropped, self.kept
        )
    }
}

/// How a duel was decided.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    /// BD-Rate of the challenger's local curve against the incumbent's, in
    /// percent. Negative means the challenger is cheaper.
    BdRate(f64),
    /// One candidate dominated the other, either with no common quality
    /// interval or because another sample already dominates the challenger.
    Dominance,
    /// No common quality interval and no dominance; table order decided.
    TableOrder,
    /// The challenger would break ladder monotonicity against the rung's
    /// neighbours.
    Ineligible,
}

/// Outcome of one incumbent/challenger comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Duel {
    pub winner: HullPoint,
    pub loser: HullPoint,
    pub decision: Decision,
}

impl Duel {
    /// True when the winner was picked by table order alone.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self.decision, Decision::TableOrder)
    }
}

/// One ambiguous (or uncontested) rung.
#[derive(Debug, Clone)]
struct Contest {
    incumbent: HullPoint,
    /// Hull vertices in this contest, incumbent first.
    hull_members: Vec<HullPoint>,
    /// Near-position and collinear challengers, in table order.
    challengers: Vec<HullPoint>,
}

impl Contest {
    fn new(incumbent: HullPoint) -> Self {
        Self {
            incumbent,
            hull_members: vec![incumbent],
            challengers: Vec::new(),
        }
    }
}

/// Result of tie-breaking a hull.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// Final rungs in ascending bitrate.
    pub rungs: Vec<HullPoint>,
    /// Per table index: the rung that beat this sample in a contest.
    pub tie_break_against: Vec<Option<usize>>,
    /// Ties settled by table order.
    pub diagnostics: Vec<UnresolvedTie>,
}

/// Resolves ambiguous hull rungs for one RD table.
pub struct TieBreaker<'a> {
    table: &'a RdTable,
    options: &'a LadderOptions,
    points: Vec<HullPoint>,
}

impl<'a> TieBreaker<'a> {
    #[must_use]
    pub fn new(table: &'a RdTable, options: &'a LadderOptions) -> Self {
        Self {
            table,
            options,
            points: super::table_points(table),
        }
    }

    /// Resolve every contest along `hull` (the upper hull of `front`).
    #[must_use]
    pub fn resolve(&self, front: &ParetoFront, hull: &[HullPoint]) -> Resolution {
        let contests = self.contests(front, hull);

        let mut rungs: Vec<HullPoint> = Vec::with_capacity(contests.len());
        let mut tie_break_against = vec![None; self.table.len()];
        let mut diagnostics = Vec::new();

        for (k, contest) in contests.iter().enumerate() {
            let prev = rungs.last().copied();
            let next = contests.get(k + 1).map(|c| c.incumbent);

            let mut winner = contest.incumbent;
            let mut losers = Vec::with_capacity(contest.challengers.len());
            for &challenger in &contest.challengers {
                let duel = if self.is_dominated(&challenger) {
                    Duel {
                        winner,
                        loser: challenger,
                        decision: Decision::Dominance,
                    }
                } else {
                    self.duel(winner, challenger, prev, next)
                };
                if duel.is_unresolved() {
                    diagnostics.push(UnresolvedTie {
                        kept: self.id(duel.winner).to_string(),
                        dropped: self.id(duel.loser).to_string(),
                    });
                }
                losers.push(duel.loser);
                winner = duel.winner;
            }

            for loser in losers {
                tie_break_against[loser.index] = Some(winner.index);
            }
            rungs.push(winner);
        }

        Resolution {
            rungs,
            tie_break_against,
            diagnostics,
        }
    }

    /// Compare a challenger against the current incumbent of a rung whose
    /// neighbouring rungs are `prev` and `next`.
    ///
    /// # Example
    ///
    /// ```
    /// use bitrate_ladder::ladder::{Decision, HullPoint, LadderOptions, TieBreaker};
    /// use bitrate_ladder::{Codec, QualitySummary, RdTable, Sample};
    ///
    /// let samples = vec![
    ///     Sample::new("a", 4000.0, 1920, 1080, Codec::H264, QualitySummary::uniform(90.0)),
    ///     Sample::new("b", 4000.0, 1280, 720, Codec::H264, QualitySummary::uniform(85.0)),
    /// ];
    /// let table = RdTable::build(&samples).unwrap();
    /// let options = LadderOptions::default();
    /// let breaker = TieBreaker::new(&table, &options);
    ///
    /// let duel = breaker.duel(
    ///     HullPoint::new(1, 4000.0, 85.0),
    ///     HullPoint::new(0, 4000.0, 90.0),
    ///     None,
    ///     None,
    /// );
    /// assert_eq!(duel.winner.index, 0);
    /// assert_eq!(duel.decision, Decision::Dominance);
    /// ```
    #[must_use]
    pub fn duel(
        &self,
        incumbent: HullPoint,
        challenger: HullPoint,
        prev: Option<HullPoint>,
        next: Option<HullPoint>,
    ) -> Duel {
        let keep = |decision| Duel {
            winner: incumbent,
            loser: challenger,
            decision,
        };
        let replace = |decision| Duel {
            winner: challenger,
            loser: incumbent,
            decision,
        };

        if !fits_between(challenger, prev, next) {
            return keep(Decision::Ineligible);
        }

        let reference = local_curve(incumbent, prev, next);
        let test = local_curve(challenger, prev, next);

        match bd_rate(&reference, &test) {
            Some(bd) if bd < -EQUIVALENT_BD_RATE => replace(Decision::BdRate(bd)),
            Some(bd) => keep(Decision::BdRate(bd)),
            None if challenger.dominates(&incumbent) => replace(Decision::Dominance),
            None if incumbent.dominates(&challenger) => keep(Decision::Dominance),
            None if challenger.index < incumbent.index => replace(Decision::TableOrder),
            None => keep(Decision::TableOrder),
        }
    }

    fn near(&self, a: &HullPoint, b: &HullPoint) -> bool {
        (a.x - b.x).abs() <= self.options.bitrate_epsilon_kbps
            && (a.y - b.y).abs() <= self.options.quality_epsilon
    }

    /// Whether any table sample dominates `point`.
    fn is_dominated(&self, point: &HullPoint) -> bool {
        self.points.iter().any(|p| p.dominates(point))
    }

    fn id(&self, point: HullPoint) -> &str {
        self.table.get(point.index).sample.id()
    }

    /// Group the hull into contests and attach challengers.
    fn contests(&self, front: &ParetoFront, hull: &[HullPoint]) -> Vec<Contest> {
        let mut contests: Vec<Contest> = Vec::with_capacity(hull.len());
        for vertex in hull {
            if let Some(last) = contests.last_mut() {
                if last.hull_members.iter().any(|m| self.near(m, vertex)) {
                    last.hull_members.push(*vertex);
                    last.challengers.push(*vertex);
                    continue;
                }
            }
            contests.push(Contest::new(*vertex));
        }

        let on_hull: HashSet<usize> = hull.iter().map(|p| p.index).collect();
        for &point in &self.points {
            if on_hull.contains(&point.index) {
                continue;
            }

            if let Some(contest) = contests
                .iter_mut()
                .find(|c| c.hull_members.iter().any(|m| self.near(m, &point)))
            {
                contest.challengers.push(point);
                continue;
            }

            if !front.contains(point.index) {
                continue;
            }
            let Some(segment) = hull
                .windows(2)
                .find(|w| w[0].x < point.x && point.x < w[1].x)
            else {
                continue;
            };
            let (left, right) = (segment[0], segment[1]);
            if !is_collinear(&left, &point, &right) {
                continue;
            }
            let endpoint = if point.x - left.x <= right.x - point.x {
                left
            } else {
                right
            };
            if let Some(contest) = contests
                .iter_mut()
                .find(|c| c.hull_members.contains(&endpoint))
            {
                contest.challengers.push(point);
            }
        }

        for contest in &mut contests {
            contest.challengers.sort_by_key(|p| p.index);
        }
        contests
    }
}

/// Whether `candidate` keeps the ladder strictly increasing in bitrate
/// between its neighbouring rungs, gains quality over the previous rung and
/// does not exceed the next one.
fn fits_between(candidate: HullPoint, prev: Option<HullPoint>, next: Option<HullPoint>) -> bool {
    let after_prev = prev.is_none_or(|p| p.x < candidate.x && p.y < candidate.y);
    let before_next = next.is_none_or(|n| candidate.x < n.x && candidate.y <= n.y);
    after_prev && before_next
}

/// Local (bitrate, quality) curve of a candidate: the candidate plus each
/// neighbour that keeps the curve strictly increasing in both axes.
fn local_curve(
    candidate: HullPoint,
    prev: Option<HullPoint>,
    next: Option<HullPoint>,
) -> Vec<(f64, f64)> {
    let mut curve = Vec::with_capacity(3);
    if let Some(p) = prev.filter(|p| p.x < candidate.x && p.y < candidate.y) {
        curve.push((p.x, p.y));
    }
    curve.push((candidate.x, candidate.y));
    if let Some(n) = next.filter(|n| n.x > candidate.x && n.y > candidate.y) {
        curve.push((n.x, n.y));
    }
    curve
}
