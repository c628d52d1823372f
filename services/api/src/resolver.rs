//! Staff-preference resolution
//!
//! A booking carries an ordered list of preferred staff ids. By the time an
//! owner confirms the appointment, some of those ids may no longer exist on
//! the company roster (the staff member was removed). Resolution partitions
//! the current roster against the preference list and never fails on a stale
//! id — it is simply dropped.

use uuid::Uuid;

use crate::models::Staff;

/// The company roster partitioned against a preference list
#[derive(Debug, Clone)]
pub struct ResolvedRoster {
    /// Roster members the booking user asked for, in roster order.
    pub preferred: Vec<Staff>,
    /// The rest of the roster, in roster order.
    pub other: Vec<Staff>,
}

/// Partition `roster` into preferred and other staff.
///
/// `preferred` is the intersection of roster and preferences in **roster**
/// order (not preference order); preference ids absent from the roster are
/// ignored. Every roster member lands in exactly one partition.
pub fn resolve(roster: &[Staff], preferences: &[Uuid]) -> ResolvedRoster {
    let (preferred, other): (Vec<Staff>, Vec<Staff>) = roster
        .iter()
        .cloned()
        .partition(|staff| preferences.contains(&staff.id));

    ResolvedRoster { preferred, other }
}

/// Pick the default staff suggestion for the assignment dialog.
///
/// An already-assigned staff member that still resolves on the roster wins;
/// otherwise the first preference that resolves; otherwise nothing, and the
/// caller must choose manually.
pub fn suggest(roster: &[Staff], preferences: &[Uuid], current: Option<Uuid>) -> Option<Uuid> {
    let on_roster = |id: &Uuid| roster.iter().any(|staff| staff.id == *id);

    if let Some(current) = current {
        if on_roster(&current) {
            return Some(current);
        }
    }

    preferences.iter().find(|id| on_roster(id)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StaffStatus;
    use chrono::Utc;

    fn staff(id: Uuid) -> Staff {
        Staff {
            id,
            user_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            working_hours_start: None,
            working_hours_end: None,
            skills: None,
            professional_qualifications: None,
            status: StaffStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ids(members: &[Staff]) -> Vec<Uuid> {
        members.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_partition_covers_roster_exactly_once() {
        let roster: Vec<Staff> = (0..5).map(|_| staff(Uuid::new_v4())).collect();
        let preferences = vec![roster[3].id, roster[1].id, Uuid::new_v4()];

        let resolved = resolve(&roster, &preferences);

        let mut union = ids(&resolved.preferred);
        union.extend(ids(&resolved.other));
        let mut expected = ids(&roster);
        union.sort();
        expected.sort();
        assert_eq!(union, expected);

        for id in ids(&resolved.preferred) {
            assert!(!ids(&resolved.other).contains(&id));
        }
    }

    #[test]
    fn test_preferred_keeps_roster_order_not_preference_order() {
        let a = staff(Uuid::new_v4());
        let b = staff(Uuid::new_v4());
        let c = staff(Uuid::new_v4());
        let roster = vec![a.clone(), b.clone(), c.clone()];
        // Preferences list c before a; roster order must still win.
        let preferences = vec![c.id, a.id];

        let resolved = resolve(&roster, &preferences);

        assert_eq!(ids(&resolved.preferred), vec![a.id, c.id]);
        assert_eq!(ids(&resolved.other), vec![b.id]);
    }

    #[test]
    fn test_stale_preferences_never_fail() {
        let roster: Vec<Staff> = (0..3).map(|_| staff(Uuid::new_v4())).collect();
        let preferences = vec![Uuid::new_v4(), Uuid::new_v4()];

        let resolved = resolve(&roster, &preferences);

        assert!(resolved.preferred.is_empty());
        assert_eq!(resolved.other.len(), 3);
        assert_eq!(suggest(&roster, &preferences, None), None);
    }

    #[test]
    fn test_empty_roster_and_empty_preferences() {
        let resolved = resolve(&[], &[Uuid::new_v4()]);
        assert!(resolved.preferred.is_empty());
        assert!(resolved.other.is_empty());

        let roster = vec![staff(Uuid::new_v4())];
        let resolved = resolve(&roster, &[]);
        assert!(resolved.preferred.is_empty());
        assert_eq!(resolved.other.len(), 1);
    }

    #[test]
    fn test_suggestion_takes_first_resolving_preference() {
        let roster: Vec<Staff> = (0..3).map(|_| staff(Uuid::new_v4())).collect();
        let stale = Uuid::new_v4();
        let preferences = vec![stale, roster[2].id, roster[0].id];

        assert_eq!(suggest(&roster, &preferences, None), Some(roster[2].id));
    }

    #[test]
    fn test_current_assignment_wins_over_preferences() {
        let roster: Vec<Staff> = (0..3).map(|_| staff(Uuid::new_v4())).collect();
        let preferences = vec![roster[0].id];

        assert_eq!(
            suggest(&roster, &preferences, Some(roster[1].id)),
            Some(roster[1].id)
        );

        // A stale current assignment falls back to the preferences.
        assert_eq!(
            suggest(&roster, &preferences, Some(Uuid::new_v4())),
            Some(roster[0].id)
        );
    }

    #[test]
    fn test_partition_with_partially_stale_preferences() {
        // Roster [A, B, C], preferences [C, Z] with Z unknown.
        let a = staff(Uuid::new_v4());
        let b = staff(Uuid::new_v4());
        let c = staff(Uuid::new_v4());
        let roster = vec![a.clone(), b.clone(), c.clone()];
        let preferences = vec![c.id, Uuid::new_v4()];

        let resolved = resolve(&roster, &preferences);

        assert_eq!(ids(&resolved.preferred), vec![c.id]);
        assert_eq!(ids(&resolved.other), vec![a.id, b.id]);
        assert_eq!(suggest(&roster, &preferences, None), Some(c.id));
    }
}
