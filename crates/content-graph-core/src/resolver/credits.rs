use std::collections::HashSet;

use serde::Serialize;

use crate::expand::{expand_field, RelationshipCost};
use crate::model::{Connection, Credit, ObjectKind, ObjectList, Person, PersonCredit};

use super::Resolver;

/// Drop every credit that introduces a person already seen earlier in the list.
///
/// Credits whose people were cut by the depth budget are kept and do not mark anyone as seen.
#[must_use]
pub fn dedup_credits(credits: Vec<Credit>) -> Vec<Credit> {
    let mut seen: HashSet<String> = HashSet::new();
    credits
        .into_iter()
        .filter(|credit| {
            let Some(people) = &credit.people else {
                return true;
            };
            if people.objects.iter().any(|person| seen.contains(&person.uid)) {
                tracing::trace!(credit_id = %credit.uid, "dropping credit with repeated person");
                return false;
            }
            seen.extend(people.objects.iter().map(|person| person.uid.clone()));
            true
        })
        .collect()
}

/// A person together with every credit that names them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PersonWithCredits {
    #[serde(flatten)]
    pub person: Person,
    pub credits: ObjectList<PersonCredit>,
}

impl<'a> Resolver<'a> {
    /// A credit owned by an object at `owner_depth`. People and roles sit two hops from the
    /// owner.
    #[must_use]
    pub fn credit(&self, id: &str, owner_depth: usize) -> Option<Credit> {
        let record = self.store.credits.get(id)?;
        let join = RelationshipCost::ThroughJoin;
        let people = expand_field(record.field("person"), owner_depth, join, |person_id, depth| {
            self.person(person_id, depth)
        });
        let roles =
            expand_field(record.field("role"), owner_depth, join, |role_id, _| self.role(role_id));
        Some(Credit {
            kind: ObjectKind::Credit,
            uid: record.id.clone(),
            external_id: record.external_id().to_string(),
            character: record.text("character").map(str::to_string),
            people: Connection::wrap(people),
            roles: Connection::wrap(roles),
        })
    }

    /// Person plus all credits listing them, each with its roles and the movies and episodes
    /// that reference it.
    #[must_use]
    pub fn person_credits(&self, person_id: &str) -> Option<PersonWithCredits> {
        let person = self.person(person_id, 0)?;
        let credits = self
            .store
            .credits
            .iter()
            .filter(|credit| credit.ids("person").contains(&person_id))
            .map(|credit| PersonCredit {
                kind: ObjectKind::Credit,
                uid: credit.id.clone(),
                character: credit.text("character").map(str::to_string),
                roles: ObjectList::new(
                    credit.ids("role").into_iter().filter_map(|id| self.role(id)).collect(),
                ),
                movies: ObjectList::new(
                    self.store
                        .media_linked_to(ObjectKind::Movie, "credits", &credit.id)
                        .filter_map(|record| self.movie(record, 1))
                        .collect(),
                ),
                episodes: ObjectList::new(
                    self.store
                        .media_linked_to(ObjectKind::Episode, "credits", &credit.id)
                        .filter_map(|record| self.episode(record, 1))
                        .collect(),
                ),
            })
            .collect();
        Some(PersonWithCredits { person, credits: ObjectList::new(credits) })
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::test_support::{fixture_context, fixture_store};

    fn person(uid: &str) -> Person {
        Person {
            kind: ObjectKind::Person,
            uid: uid.to_string(),
            external_id: uid.to_string(),
            slug: None,
            name: None,
            abbreviation: None,
            alias: None,
            bio_long: None,
            bio_medium: None,
            bio_short: None,
            genre: None,
            date_of_birth: None,
            name_sort: None,
            place_of_birth: None,
            images: None,
        }
    }

    fn credit(uid: &str, people: Option<Vec<&str>>) -> Credit {
        Credit {
            kind: ObjectKind::Credit,
            uid: uid.to_string(),
            external_id: uid.to_string(),
            character: None,
            people: people.map(|uids| Connection::new(uids.into_iter().map(person).collect())),
            roles: None,
        }
    }

    #[test]
    fn truncated_people_skip_the_duplicate_check() {
        let kept = dedup_credits(vec![
            credit("c1", Some(vec!["p1"])),
            credit("c2", None),
            credit("c3", Some(vec!["p2", "p1"])),
            credit("c4", None),
            credit("c5", Some(vec!["p2"])),
        ]);
        let uids: Vec<_> = kept.iter().map(|credit| credit.uid.as_str()).collect();
        assert_eq!(uids, vec!["c1", "c2", "c4", "c5"]);
    }

    #[test]
    fn person_credits_list_referencing_titles() {
        let store = fixture_store();
        let ctx = fixture_context();
        let resolver = Resolver::new(&store, &ctx);

        let Some(result) = resolver.person_credits("p1") else {
            panic!("p1 should resolve");
        };
        let uids: Vec<_> =
            result.credits.objects.iter().map(|credit| credit.uid.as_str()).collect();
        assert_eq!(uids, vec!["c1", "c3"]);

        let first = &result.credits.objects[0];
        assert_eq!(first.character.as_deref(), Some("Captain Vale"));
        assert_eq!(first.roles.objects.len(), 1);
        let movies: Vec<_> =
            first.movies.objects.iter().map(|movie| movie.media.uid.as_str()).collect();
        assert_eq!(movies, vec!["m1"]);
        let episodes: Vec<_> =
            first.episodes.objects.iter().map(|episode| episode.media.uid.as_str()).collect();
        assert_eq!(episodes, vec!["e1"]);
        assert_eq!(first.movies.objects[0].media.title.as_deref(), Some("Star Voyage"));
        assert!(resolver.person_credits("missing").is_none());
    }

    proptest! {
        #[test]
        fn property_no_person_appears_twice_after_dedup(
            groups in prop::collection::vec(
                prop::option::of(prop::collection::vec(0_u8..6, 0..3)),
                0..8,
            )
        ) {
            let credits: Vec<Credit> = groups
                .iter()
                .enumerate()
                .map(|(index, people)| {
                    let uids: Option<Vec<String>> =
                        people.as_ref().map(|ids| ids.iter().map(|id| format!("p{id}")).collect());
                    let refs = uids.as_ref().map(|ids| ids.iter().map(String::as_str).collect());
                    credit(&format!("c{index}"), refs)
                })
                .collect();
            let truncated = credits.iter().filter(|credit| credit.people.is_none()).count();

            let kept = dedup_credits(credits);

            let mut seen = HashSet::new();
            for credit in &kept {
                if let Some(people) = &credit.people {
                    let mut local = HashSet::new();
                    for person in &people.objects {
                        if local.insert(person.uid.clone()) {
                            let first_time = seen.insert(person.uid.clone());
                            prop_assert!(first_time, "person {} repeated", person.uid);
                        }
                    }
                }
            }
            let kept_truncated = kept.iter().filter(|credit| credit.people.is_none()).count();
            prop_assert_eq!(kept_truncated, truncated);
        }
    }
}
