use super::booth::Booth;
use super::dispatcher::Customer;
use super::schedule::StaffSchedule;
use crate::core::types::{BoothId, CollectorType, TimeBlock, TransactionType};
use std::collections::{BTreeSet, VecDeque};

/// Whoever is asking for a booth
#[derive(Debug, Clone, PartialEq)]
pub enum Requester {
    Customer(Customer),
    Removal(RemovalOrder),
}

/// Booths of one type still to be taken off shift, processed front to back
///
/// Only the front booth has an outstanding request; the next one is asked
/// for once that request is granted.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalOrder {
    pub collector_type: CollectorType,
    pub remaining: VecDeque<BoothId>,
}

/// The fare-collection station: every booth plus the schedule driving them
///
/// Booths are created once, sized to the peak requirement of each type, and
/// only toggled on and off shift afterwards. With-terminal booths come first
/// in the booth list.
#[derive(Debug)]
pub struct Station {
    booths: Vec<Booth<Requester>>,
    by_type: [Vec<BoothId>; 2],
    on_shift: [BTreeSet<BoothId>; 2],
    schedule: StaffSchedule,
}

impl Station {
    pub fn new(schedule: StaffSchedule) -> Self {
        let mut booths = Vec::new();
        let mut by_type: [Vec<BoothId>; 2] = [Vec::new(), Vec::new()];
        for collector_type in CollectorType::ALL {
            for _ in 0..schedule.peak(collector_type) {
                let id = BoothId(booths.len());
                booths.push(Booth::new(id, collector_type));
                by_type[collector_type.index()].push(id);
            }
        }

        log::debug!(
            "[Station] {} with-terminal and {} without-terminal booths",
            by_type[0].len(),
            by_type[1].len()
        );

        Self {
            booths,
            by_type,
            on_shift: [BTreeSet::new(), BTreeSet::new()],
            schedule,
        }
    }

    pub fn booths(&self) -> &[Booth<Requester>] {
        &self.booths
    }

    pub fn booth(&self, id: BoothId) -> &Booth<Requester> {
        &self.booths[id.0]
    }

    pub fn booth_mut(&mut self, id: BoothId) -> &mut Booth<Requester> {
        &mut self.booths[id.0]
    }

    pub fn on_shift_count(&self, collector_type: CollectorType) -> usize {
        self.on_shift[collector_type.index()].len()
    }

    pub fn total_on_shift(&self) -> usize {
        self.on_shift.iter().map(BTreeSet::len).sum()
    }

    /// On-shift booths able to serve `kind`, in booth-list order
    pub fn eligible_booths(
        &self,
        kind: TransactionType,
    ) -> impl Iterator<Item = &Booth<Requester>> + '_ {
        CollectorType::ALL
            .into_iter()
            .filter(move |c| c.can_serve(kind))
            .flat_map(move |c| self.on_shift[c.index()].iter())
            .map(move |id| &self.booths[id.0])
    }

    /// All on-shift booths in booth-list order
    pub fn on_shift_booths(&self) -> impl Iterator<Item = &Booth<Requester>> + '_ {
        self.on_shift.iter().flatten().map(move |id| &self.booths[id.0])
    }

    /// Toggle a booth's shift flag, keeping the per-type index in step
    pub fn set_on_shift(&mut self, id: BoothId, on_shift: bool) {
        let booth = &mut self.booths[id.0];
        booth.set_on_shift(on_shift);
        let index = &mut self.on_shift[booth.collector_type().index()];
        if on_shift {
            index.insert(id);
        } else {
            index.remove(&id);
        }
    }

    /// Bring each type's on-shift count in line with the schedule for `block`
    ///
    /// Missing collectors are put on shift straight away. Surplus collectors
    /// cannot leave mid-service, so a removal order is returned for the
    /// caller to push through the booths' wait lists.
    pub fn reconcile(&mut self, block: TimeBlock) -> Vec<RemovalOrder> {
        let mut orders = Vec::new();
        for collector_type in CollectorType::ALL {
            let on_shift = self.on_shift_count(collector_type);
            let required = self.schedule.required(collector_type, block) as usize;

            if on_shift > required {
                let remaining: VecDeque<BoothId> = self.on_shift[collector_type.index()]
                    .iter()
                    .take(on_shift - required)
                    .copied()
                    .collect();
                log::debug!(
                    "[Station] block {}: removing {} {} collectors",
                    block,
                    remaining.len(),
                    collector_type
                );
                orders.push(RemovalOrder {
                    collector_type,
                    remaining,
                });
            } else if on_shift < required {
                let additions: Vec<BoothId> = self.by_type[collector_type.index()]
                    .iter()
                    .filter(|id| !self.booths[id.0].is_on_shift())
                    .take(required - on_shift)
                    .copied()
                    .collect();
                log::debug!(
                    "[Station] block {}: adding {} {} collectors",
                    block,
                    additions.len(),
                    collector_type
                );
                for id in additions {
                    self.set_on_shift(id, true);
                }
            }
        }
        orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Station {
        // Blocks: 0 -> (2, 1), 1 -> (1, 2), 2 -> (3, 0)
        let schedule = StaffSchedule::new(vec![2, 1, 3], vec![1, 2, 0]).unwrap();
        Station::new(schedule)
    }

    #[test]
    fn test_booths_sized_to_peak_requirement() {
        let station = station();
        let types: Vec<_> = station.booths().iter().map(|b| b.collector_type()).collect();
        assert_eq!(
            types,
            vec![
                CollectorType::WithTerminal,
                CollectorType::WithTerminal,
                CollectorType::WithTerminal,
                CollectorType::WithoutTerminal,
                CollectorType::WithoutTerminal,
            ]
        );
        assert_eq!(station.total_on_shift(), 0);
    }

    #[test]
    fn test_reconcile_adds_in_booth_order() {
        let mut station = station();
        let orders = station.reconcile(TimeBlock(0));
        assert!(orders.is_empty());

        let on: Vec<_> = station.on_shift_booths().map(|b| b.id()).collect();
        assert_eq!(on, vec![BoothId(0), BoothId(1), BoothId(3)]);
    }

    #[test]
    fn test_reconcile_issues_removal_for_surplus() {
        let mut station = station();
        station.reconcile(TimeBlock(0));
        let orders = station.reconcile(TimeBlock(1));

        // One with-terminal too many; one without-terminal missing
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].collector_type, CollectorType::WithTerminal);
        assert_eq!(orders[0].remaining, VecDeque::from(vec![BoothId(0)]));
        assert_eq!(station.on_shift_count(CollectorType::WithoutTerminal), 2);

        // Removal has not been granted yet, so the booth is still on shift
        assert_eq!(station.on_shift_count(CollectorType::WithTerminal), 2);
    }

    #[test]
    fn test_reconcile_equal_counts_is_noop() {
        let mut station = station();
        station.reconcile(TimeBlock(0));
        let before: Vec<_> = station.on_shift_booths().map(|b| b.id()).collect();
        assert!(station.reconcile(TimeBlock(0)).is_empty());
        let after: Vec<_> = station.on_shift_booths().map(|b| b.id()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_reload_only_sees_terminal_booths() {
        let mut station = station();
        station.reconcile(TimeBlock(0));
        let reload: Vec<_> = station
            .eligible_booths(TransactionType::Reload)
            .map(|b| b.id())
            .collect();
        let buy: Vec<_> = station.eligible_booths(TransactionType::Buy).map(|b| b.id()).collect();
        assert_eq!(reload, vec![BoothId(0), BoothId(1)]);
        assert_eq!(buy, vec![BoothId(0), BoothId(1), BoothId(3)]);
    }

    #[test]
    fn test_set_on_shift_keeps_index_in_step() {
        let mut station = station();
        station.set_on_shift(BoothId(4), true);
        assert!(station.booth(BoothId(4)).is_on_shift());
        assert_eq!(station.on_shift_count(CollectorType::WithoutTerminal), 1);
        station.set_on_shift(BoothId(4), false);
        assert_eq!(station.on_shift_count(CollectorType::WithoutTerminal), 0);
    }
}
