use serde::{Deserialize, Serialize};

use crate::models::entries::SchoolType;

#[derive(Debug, Clone, Serialize)]
pub struct School {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub school_type: SchoolType,
    pub location: &'static str,
    pub is_public: bool,
}

const fn school(
    id: &'static str,
    name: &'static str,
    school_type: SchoolType,
    location: &'static str,
    is_public: bool,
) -> School {
    School {
        id,
        name,
        school_type,
        location,
        is_public,
    }
}

use SchoolType::*;

static SCHOOLS: [School; 43] = [
    school("e1", "서울초등학교", Elementary, "서울", true),
    school("e2", "한국초등학교", Elementary, "서울", false),
    school("m1", "서울중학교", Middle, "서울", true),
    school("m2", "한국중학교", Middle, "서울", false),
    school("m3", "대원중학교", Middle, "서울", false),
    school("h1", "서울고등학교", High, "서울", true),
    school("h2", "한국고등학교", High, "서울", false),
    school("h3", "대원고등학교", High, "서울", false),
    school("h4", "경기고등학교", High, "서울", true),
    school("h5", "경복고등학교", High, "서울", true),
    school("c1", "서울전문대학", College, "서울", true),
    school("c2", "한국전문대학", College, "서울", false),
    school("u1", "서울대학교", University, "서울", true),
    school("u2", "연세대학교", University, "서울", false),
    school("u3", "고려대학교", University, "서울", false),
    school("u4", "성균관대학교", University, "서울", false),
    school("u5", "한양대학교", University, "서울", false),
    school("u6", "중앙대학교", University, "서울", false),
    school("u7", "경희대학교", University, "서울", false),
    school("u8", "서강대학교", University, "서울", false),
    school("u9", "동국대학교", University, "서울", false),
    school("u10", "국민대학교", University, "서울", false),
    school("u11", "숙명여자대학교", University, "서울", false),
    school("u12", "이화여자대학교", University, "서울", false),
    school("u13", "숭실대학교", University, "서울", false),
    school("u14", "건국대학교", University, "서울", false),
    school("u15", "단국대학교", University, "서울", false),
    school("u16", "부산대학교", University, "부산", true),
    school("u17", "전남대학교", University, "광주", true),
    school("u18", "전북대학교", University, "전주", true),
    school("u19", "경북대학교", University, "대구", true),
    school("u20", "충남대학교", University, "대전", true),
    school("u21", "충북대학교", University, "청주", true),
    school("u22", "강원대학교", University, "춘천", true),
    school("u23", "제주대학교", University, "제주", true),
    school("u24", "부산외국어대학교", University, "부산", false),
    school("u25", "동아대학교", University, "부산", false),
    school("u26", "경성대학교", University, "부산", false),
    school("u27", "동의대학교", University, "부산", false),
    school("u28", "부경대학교", University, "부산", false),
    school("g1", "서울대학교 대학원", Graduate, "서울", true),
    school("g2", "연세대학교 대학원", Graduate, "서울", false),
    school("g3", "고려대학교 대학원", Graduate, "서울", false),
];

/// Every field is optional; set fields must all match.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchoolFilter {
    #[serde(rename = "type")]
    pub school_type: Option<SchoolType>,
    pub location: Option<String>,
    /// Case-insensitive substring of the name or the location.
    pub q: Option<String>,
}

impl SchoolFilter {
    fn matches(&self, school: &School) -> bool {
        if self.school_type.is_some_and(|t| t != school.school_type) {
            return false;
        }
        if let Some(location) = self.location.as_deref().map(str::trim) {
            if !location.is_empty() && location != school.location {
                return false;
            }
        }
        match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => {
                let q = q.to_lowercase();
                school.name.to_lowercase().contains(&q)
                    || school.location.to_lowercase().contains(&q)
            }
            _ => true,
        }
    }
}

/// Schools matching `filter`, in directory order.
pub fn find_schools(filter: &SchoolFilter) -> Vec<&'static School> {
    SCHOOLS.iter().filter(|s| filter.matches(s)).collect()
}
