use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::CatalogError;

#[derive(Debug, Clone, Serialize)]
pub struct SkillGroup {
    pub id: &'static str,
    pub name: &'static str,
    pub skills: &'static [&'static str],
}

static SKILL_GROUPS: [SkillGroup; 11] = [
    SkillGroup {
        id: "programming",
        name: "프로그래밍 언어",
        skills: &[
            "JavaScript", "TypeScript", "Python", "Java", "C++", "C#", "Go", "Rust", "PHP", "Ruby",
            "Swift", "Kotlin", "Scala", "R", "MATLAB", "Dart",
        ],
    },
    SkillGroup {
        id: "frontend",
        name: "프론트엔드",
        skills: &[
            "React", "Vue.js", "Angular", "Svelte", "Next.js", "Nuxt.js", "HTML5", "CSS3", "Sass",
            "Less", "Tailwind CSS", "Bootstrap", "Webpack", "Vite", "Babel", "ESLint", "Prettier",
        ],
    },
    SkillGroup {
        id: "backend",
        name: "백엔드",
        skills: &[
            "Node.js", "Express.js", "NestJS", "Django", "Flask", "Spring Boot", "FastAPI",
            "ASP.NET Core", "Laravel", "Ruby on Rails", "Gin", "GraphQL", "REST API", "gRPC",
            "WebSocket",
        ],
    },
    SkillGroup {
        id: "database",
        name: "데이터베이스",
        skills: &[
            "MySQL", "PostgreSQL", "MongoDB", "Redis", "SQLite", "Oracle", "SQL Server", "MariaDB",
            "Cassandra", "DynamoDB", "Firebase", "Elasticsearch", "Neo4j", "InfluxDB",
        ],
    },
    SkillGroup {
        id: "devops",
        name: "DevOps & 클라우드",
        skills: &[
            "Docker", "Kubernetes", "AWS", "Azure", "GCP", "Terraform", "Jenkins", "GitLab CI",
            "GitHub Actions", "Ansible", "Chef", "Prometheus", "Grafana", "ELK Stack", "Istio",
        ],
    },
    SkillGroup {
        id: "mobile",
        name: "모바일 개발",
        skills: &[
            "React Native", "Flutter", "Xamarin", "Ionic", "Cordova", "Android Studio", "Xcode",
            "Kotlin", "Swift", "Objective-C",
        ],
    },
    SkillGroup {
        id: "ai-ml",
        name: "AI & 머신러닝",
        skills: &[
            "TensorFlow", "PyTorch", "Scikit-learn", "Keras", "OpenCV", "NLTK", "spaCy",
            "Hugging Face", "Pandas", "NumPy", "Matplotlib", "Seaborn", "Plotly", "Jupyter",
        ],
    },
    SkillGroup {
        id: "design",
        name: "디자인 & 크리에이티브",
        skills: &[
            "Figma", "Adobe XD", "Sketch", "Photoshop", "Illustrator", "InDesign", "After Effects",
            "Premiere Pro", "Blender", "Unity", "Framer", "Webflow", "Canva",
        ],
    },
    SkillGroup {
        id: "marketing",
        name: "마케팅 & 분석",
        skills: &[
            "Google Analytics", "Google Ads", "Facebook Ads", "SEO", "SEM", "Email Marketing",
            "Content Marketing", "Social Media Marketing", "HubSpot", "Mailchimp", "Buffer",
            "Hootsuite",
        ],
    },
    SkillGroup {
        id: "business",
        name: "비즈니스 & 관리",
        skills: &[
            "Project Management", "Agile", "Scrum", "Kanban", "JIRA", "Confluence", "Slack",
            "Microsoft Office", "Google Workspace", "Salesforce", "SAP", "Oracle ERP",
        ],
    },
    SkillGroup {
        id: "languages",
        name: "언어",
        skills: &[
            "한국어", "영어", "일본어", "중국어", "스페인어", "프랑스어", "독일어", "이탈리아어",
            "포르투갈어", "러시아어", "아랍어",
        ],
    },
];

pub fn skill_groups() -> &'static [SkillGroup] {
    &SKILL_GROUPS
}

pub fn skill_group(id: &str) -> Result<&'static SkillGroup, CatalogError> {
    SKILL_GROUPS
        .iter()
        .find(|g| g.id == id)
        .ok_or_else(|| CatalogError::UnknownCategory(id.to_string()))
}

/// Case-insensitive substring search over one group, or over every group when
/// `group` is `None`. Skills listed in several groups are returned once, in
/// catalog order. A blank query matches everything.
pub fn search_skills(query: &str, group: Option<&str>) -> Result<Vec<&'static str>, CatalogError> {
    let groups = match group {
        Some(id) => std::slice::from_ref(skill_group(id)?),
        None => skill_groups(),
    };
    let needle = query.trim().to_lowercase();
    let mut seen = HashSet::new();
    Ok(groups
        .iter()
        .flat_map(|g| g.skills.iter().copied())
        .filter(|skill| skill.to_lowercase().contains(&needle))
        .filter(|skill| seen.insert(*skill))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_group_ids_are_unique() {
        let ids: HashSet<_> = skill_groups().iter().map(|g| g.id).collect();
        assert_eq!(ids.len(), skill_groups().len());
        assert_eq!(skill_group("backend").unwrap().name, "백엔드");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        assert_eq!(
            search_skills("script", None).unwrap(),
            vec!["JavaScript", "TypeScript"]
        );
        assert_eq!(
            search_skills("SQL", Some("database")).unwrap(),
            vec!["MySQL", "PostgreSQL", "SQLite", "SQL Server"]
        );
    }

    #[test]
    fn test_search_all_lists_shared_skills_once() {
        let all = search_skills("", None).unwrap();
        assert_eq!(all.iter().filter(|s| **s == "Kotlin").count(), 1);
        assert_eq!(search_skills("kotlin", Some("mobile")).unwrap(), vec!["Kotlin"]);
        assert!(all.contains(&"한국어"));
    }

    #[test]
    fn test_unknown_group() {
        assert_eq!(
            search_skills("rust", Some("cooking")).unwrap_err(),
            CatalogError::UnknownCategory("cooking".into())
        );
    }
}
