// Machine-readable renderings of a canonical profile.
// JSON and YAML mirror the record's field order; CSV has a subject and a repository section.

use serde::Serialize;

use crate::error::{Result, StatsError};
use crate::model::CanonicalProfile;

/// Pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// YAML document.
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_yaml::to_string(value)?)
}

/// Subject header and row, one blank line, then repository header and rows.
pub fn to_csv(profile: &CanonicalProfile) -> Result<String> {
    let kind = profile.kind;
    let subject_type = match kind {
        crate::model::SubjectKind::User => "User",
        crate::model::SubjectKind::Organization => "Organization",
    };

    let subject = csv_section(|writer| {
        writer.write_record([
            "Type",
            "Username",
            "Name",
            kind.about_label(),
            "Location",
            "Followers",
            "Following",
            "Public Repos",
            kind.count_label(),
            "Created At",
        ])?;
        writer.write_record([
            subject_type.to_string(),
            profile.subject_id.clone(),
            profile.display_name.clone().unwrap_or_default(),
            profile.bio_or_description.clone().unwrap_or_default(),
            profile.location.clone().unwrap_or_default(),
            profile.followers.to_string(),
            profile.following.to_string(),
            profile.public_repo_count.to_string(),
            profile.public_gist_or_member_count.to_string(),
            profile.created_at.clone(),
        ])
    })?;

    let repos = csv_section(|writer| {
        writer.write_record([
            "Type",
            "Name",
            "Stars",
            "Language",
            "Forks",
            "Open Issues",
            "Last Updated",
        ])?;
        for repo in &profile.top_repositories {
            writer.write_record([
                "Repo".to_string(),
                repo.name.clone(),
                repo.stars.to_string(),
                repo.language.clone().unwrap_or_default(),
                repo.forks.to_string(),
                repo.open_issues.to_string(),
                repo.updated_at.clone(),
            ])?;
        }
        Ok(())
    })?;

    Ok(format!("{}\n{}", subject, repos))
}

fn csv_section(
    write: impl FnOnce(&mut csv::Writer<Vec<u8>>) -> std::result::Result<(), csv::Error>,
) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    write(&mut writer)?;
    let bytes = writer
        .into_inner()
        .map_err(|e| StatsError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| StatsError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CanonicalRepo, SubjectKind};

    fn profile() -> CanonicalProfile {
        CanonicalProfile {
            subject_id: "octocat".to_string(),
            display_name: Some("The Octocat".to_string()),
            bio_or_description: None,
            location: Some("San Francisco, CA".to_string()),
            followers: 100,
            following: 9,
            public_repo_count: 2,
            public_gist_or_member_count: 8,
            created_at: "2011-01-25T18:44:36Z".to_string(),
            top_repositories: vec![
                CanonicalRepo {
                    name: "hello-world".to_string(),
                    stars: 50,
                    language: Some("Rust".to_string()),
                    forks: 3,
                    open_issues: 1,
                    updated_at: "2024-01-01T00:00:00Z".to_string(),
                    size_kb: Some(10),
                },
                CanonicalRepo {
                    name: "spoon-knife".to_string(),
                    stars: 30,
                    language: None,
                    forks: 0,
                    open_issues: 0,
                    updated_at: "2023-01-01T00:00:00Z".to_string(),
                    size_kb: None,
                },
            ],
            kind: SubjectKind::User,
        }
    }

    #[test]
    fn test_json_round_trip() {
        let original = profile();
        let json = to_json(&original).unwrap();
        let parsed: CanonicalProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_json_field_order() {
        let json = to_json(&profile()).unwrap();
        let fields = [
            "\"subject_id\"",
            "\"display_name\"",
            "\"bio_or_description\"",
            "\"location\"",
            "\"followers\"",
            "\"following\"",
            "\"public_repo_count\"",
            "\"public_gist_or_member_count\"",
            "\"created_at\"",
            "\"top_repositories\"",
        ];
        let positions: Vec<usize> = fields.iter().map(|f| json.find(f).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(json.contains("\"bio_or_description\": null"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let original = profile();
        let yaml = to_yaml(&original).unwrap();
        assert!(yaml.contains("subject_id: octocat"));
        let parsed: CanonicalProfile = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_csv_sections() {
        let csv = to_csv(&profile()).unwrap();
        let sections: Vec<&str> = csv.split("\n\n").collect();
        assert_eq!(sections.len(), 2);

        let subject: Vec<&str> = sections[0].lines().collect();
        assert_eq!(subject.len(), 2);
        assert!(subject[0].starts_with("Type,Username,Name,Bio"));
        assert!(subject[1].starts_with("User,octocat,The Octocat,,\"San Francisco, CA\",100"));

        let repos: Vec<&str> = sections[1].lines().collect();
        assert_eq!(repos.len(), 3);
        assert_eq!(
            repos[1],
            "Repo,hello-world,50,Rust,3,1,2024-01-01T00:00:00Z"
        );
        assert_eq!(repos[2], "Repo,spoon-knife,30,,0,0,2023-01-01T00:00:00Z");
    }

    #[test]
    fn test_csv_without_repositories() {
        let mut empty = profile();
        empty.top_repositories.clear();
        let csv = to_csv(&empty).unwrap();
        assert_eq!(csv.matches("\n\n").count(), 1);
        assert!(csv.ends_with("Type,Name,Stars,Language,Forks,Open Issues,Last Updated\n"));
    }
}
