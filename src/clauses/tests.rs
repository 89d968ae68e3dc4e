use super::*;
use crate::{
    config::EngineConfig,
    record::{
        Address, BeneficiaryKind, Bequest, CanonicalDataRecord, Distribution, DistributionPattern, Person, PetProvision,
        RoleEntry, ShareEntry, TrustStage,
    },
};

fn person(id: &str, first: &str, last: &str, city: &str) -> Person {
    Person {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        address: Address {
            city: city.to_string(),
            province: "Ontario".to_string(),
            country: "Canada".to_string(),
        },
        ..Person::default()
    }
}

fn record() -> CanonicalDataRecord {
    let mut record = CanonicalDataRecord {
        spouse_info: Some(person("spouse", "Sam", "Lee", "Ottawa")),
        kids: vec![
            person("exec1", "Ava", "Lee", "Toronto"),
            person("exec2", "Noah", "Lee", "Guelph"),
        ],
        relatives: vec![person("exec3", "Ben", "Park", "Barrie")],
        ..CanonicalDataRecord::default()
    };
    record.personal.address.province = "Ontario".to_string();
    record
}

fn entry(who: &str, rank: u32) -> RoleEntry {
    RoleEntry {
        who: who.to_string(),
        rank,
    }
}

#[test]
fn joint_executors_then_alternate() {
    let config = EngineConfig::default();
    let text = render_appointments(
        &[entry("exec1", 1), entry("exec2", 1), entry("exec3", 2)],
        "Executor",
        &record(),
        &config,
    );
    assert_eq!(
        text,
        "<p>I appoint Ava Lee, of Toronto, Ontario, Canada and Noah Lee, of Guelph, Ontario, Canada as the JOINT Executor(s).</p>\
         <p>If Ava Lee and Noah Lee cannot act, then I appoint Ben Park, of Barrie, Ontario, Canada to be the alternate Executor(s).</p>"
    );
}

#[test]
fn single_primary_and_chain_of_alternates() {
    let config = EngineConfig::default();
    let text = render_appointments(
        &[entry("exec3", 3), entry("exec1", 1), entry("exec2", 2)],
        "Guardian",
        &record(),
        &config,
    );
    assert!(text.starts_with("<p>I appoint Ava Lee, of Toronto, Ontario, Canada as my Guardian.</p>"));
    assert!(text.contains("<p>If Ava Lee cannot act, then I appoint Noah Lee"));
    assert!(text.ends_with("<p>If Noah Lee cannot act, then I appoint Ben Park, of Barrie, Ontario, Canada to be the alternate Guardian(s).</p>"));
}

#[test]
fn empty_role_list_appoints_the_institution() {
    let config = EngineConfig::default();
    let text = render_appointments(&[], "Trustee", &record(), &config);
    assert_eq!(
        text,
        "<p>I appoint the managing professional of the appointed trust company as my Trustee.</p>"
    );
}

#[test]
fn organization_bequest_without_backup() {
    let config = EngineConfig::default();
    let bequest = Bequest {
        beneficiary: "Org A".to_string(),
        kind: BeneficiaryKind::Organization,
        share: "$5,000".to_string(),
        ..Bequest::default()
    };
    let items = render_bequests(&[bequest], &record(), &config);
    assert_eq!(items, vec!["<li>Organization: I give $5,000 to Org A.</li>".to_string()]);
}

#[test]
fn person_bequest_with_backup_and_condition() {
    let config = EngineConfig::default();
    let bequest = Bequest {
        beneficiary: "exec1".to_string(),
        share: "50%".to_string(),
        item: "my coin collection".to_string(),
        backup: Some("exec3".to_string()),
        backup_relationship: Some("cousin".to_string()),
        conditions: Some("she keeps it together".to_string()),
        ..Bequest::default()
    };
    let items = render_bequests(&[bequest], &record(), &config);
    assert_eq!(
        items[0],
        "<li>I give 50% of my coin collection to Ava Lee, of Toronto, Ontario, Canada, \
         but if Ava Lee does not survive me, I give this gift to Ben Park, of Barrie, Ontario, Canada, my cousin, \
         subject to the following condition: she keeps it together.</li>"
    );
}

#[test]
fn none_token_backups_add_no_survivorship_clause() {
    let config = EngineConfig::default();
    for token in ["N/A", "none", "", "NULL"] {
        let bequest = Bequest {
            beneficiary: "exec2".to_string(),
            item: "my car".to_string(),
            backup: Some(token.to_string()),
            ..Bequest::default()
        };
        let items = render_bequests(&[bequest], &record(), &config);
        assert_eq!(items[0], "<li>I give my car to Noah Lee, of Guelph, Ontario, Canada.</li>", "{token:?}");
    }
}

#[test]
fn bequests_keep_declared_order() {
    let config = EngineConfig::default();
    let bequests: Vec<Bequest> = ["exec3", "exec1", "exec2"]
        .iter()
        .map(|who| Bequest {
            beneficiary: who.to_string(),
            item: "a book".to_string(),
            ..Bequest::default()
        })
        .collect();
    let items = render_bequests(&bequests, &record(), &config);
    assert!(items[0].contains("Ben Park"));
    assert!(items[1].contains("Ava Lee"));
    assert!(items[2].contains("Noah Lee"));
}

#[test]
fn distribution_modes() {
    let config = EngineConfig::default();
    let record = record();

    let beneficiaries = Distribution::Beneficiaries(vec![ShareEntry {
        who: "exec1".to_string(),
        share: "100%".to_string(),
        backup: Some("exec2".to_string()),
    }]);
    assert_eq!(
        render_distribution(&beneficiaries, &record, &config),
        "to the following beneficiaries in the following shares:<ul>\
         <li>100% to Ava Lee, of Toronto, Ontario, Canada, or if Ava Lee does not survive me, to Noah Lee, of Guelph, Ontario, Canada</li></ul>"
    );

    let heirs = Distribution::Pattern(DistributionPattern::HeirsAtLaw);
    assert_eq!(
        render_distribution(&heirs, &record, &config),
        "to my heirs at law as determined under the laws of the Province of Ontario"
    );
    assert_eq!(
        render_distribution(&Distribution::Beneficiaries(Vec::new()), &record, &config),
        render_distribution(&heirs, &record, &config)
    );

    let spouse_first = Distribution::Pattern(DistributionPattern::SpouseThenChildren);
    assert!(render_distribution(&spouse_first, &record, &config).starts_with("to my spouse, Sam Lee, of Ottawa"));

    let custom = Distribution::Custom("  to the Humane Society of Canada ".to_string());
    assert_eq!(render_distribution(&custom, &record, &config), "to the Humane Society of Canada");
}

#[test]
fn family_patterns_with_and_without_spouse() {
    let config = EngineConfig::default();
    let mut record = record();

    let per_capita = Distribution::Pattern(DistributionPattern::ChildrenPerCapita);
    assert_eq!(
        render_distribution(&per_capita, &record, &config),
        "to my children who survive me in equal shares per capita"
    );

    let split = Distribution::Pattern(DistributionPattern::SplitBetweenFamilies);
    assert_eq!(
        render_distribution(&split, &record, &config),
        "as to one half to my heirs at law and as to one half to the heirs at law of my spouse, Sam Lee, of Ottawa, Ontario, Canada"
    );

    record.spouse_info = None;
    assert_eq!(
        render_distribution(&split, &record, &config),
        "as to one half to my heirs at law and as to one half to the heirs at law of my spouse"
    );
    let spouse_first = Distribution::Pattern(DistributionPattern::SpouseThenChildren);
    assert_eq!(
        render_distribution(&spouse_first, &record, &config),
        "to my children who survive me in equal shares per stirpes"
    );

    record.personal.address.province = String::new();
    assert_eq!(
        render_distribution(&Distribution::Custom("   ".to_string()), &record, &config),
        "to my heirs at law as determined under the laws of the jurisdiction in which I reside"
    );
}

#[test]
fn record_text_is_escaped_in_clauses() {
    let config = EngineConfig::default();
    let mut record = record();
    record.kids[0].last_name = "<Lee & Co>".to_string();

    let bequests = [Bequest {
        beneficiary: "exec1".to_string(),
        item: "my ${{ .personal }} box".to_string(),
        conditions: Some("if <over> 21".to_string()),
        ..Bequest::default()
    }];
    assert_eq!(
        render_bequests(&bequests, &record, &config),
        vec![
            "<li>I give my &#36;{{ .personal }} box to Ava &lt;Lee &amp; Co&gt;, of Toronto, Ontario, Canada, \
             subject to the following condition: if &lt;over&gt; 21.</li>"
                .to_string()
        ]
    );

    let custom = Distribution::Custom("to R&D".to_string());
    assert_eq!(render_distribution(&custom, &record, &config), "to R&amp;D");

    let text = render_appointments(&[entry("exec1", 1)], "Executor", &record, &config);
    assert_eq!(
        text,
        "<p>I appoint Ava &lt;Lee &amp; Co&gt;, of Toronto, Ontario, Canada as my Executor.</p>"
    );
}

#[test]
fn escape_text_leaves_plain_prose() {
    assert_eq!(escape_text("Rex's $500 {fund}"), "Rex's $500 {fund}");
    assert_eq!(escape_text("$${{x}}"), "$&#36;{{x}}");
}

#[test]
fn trust_schedule_stages() {
    assert_eq!(
        render_trust_schedule(None),
        "the whole of the share upon attaining the age of majority"
    );
    let stages = [
        TrustStage {
            age: 25,
            share_percent: 50.0,
        },
        TrustStage {
            age: 30,
            share_percent: 12.5,
        },
    ];
    assert_eq!(
        render_trust_schedule(Some(&stages[..])),
        "<ul><li>50% of the share upon attaining the age of 25</li>\
         <li>12.5% of the share upon attaining the age of 30</li></ul>"
    );
}

#[test]
fn pets_with_backup_and_fund() {
    let config = EngineConfig::default();
    let pets = [PetProvision {
        pet_name: "Rex".to_string(),
        caretaker: "exec2".to_string(),
        backup: Some("stranger".to_string()),
        fund_amount: Some("$2,000".to_string()),
    }];
    let items = render_pets(&pets, &record(), &config);
    assert_eq!(
        items[0],
        "<li>I give my pet Rex to Noah Lee, of Guelph, Ontario, Canada, or if Noah Lee is unable or unwilling to care for Rex, \
         to [UNKNOWN PERSON], together with the sum of $2,000 for Rex's care.</li>"
    );
}
