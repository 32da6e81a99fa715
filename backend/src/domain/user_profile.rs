//! User profiles mirrored from the identity provider.

use chrono::{DateTime, Utc};

use super::{CallerIdentity, UserId};

/// Profile row keyed by the identity provider's subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub nombre_completo: String,
    pub empresa: Option<String>,
    pub organizacion: Option<String>,
    pub activo: bool,
    pub fecha_registro: DateTime<Utc>,
    pub fecha_actualizacion: DateTime<Utc>,
}

impl UserProfile {
    /// Profile created implicitly on a caller's first request.
    ///
    /// # Examples
    /// ```
    /// use chrono::Utc;
    /// use survey_backend::domain::{CallerIdentity, UserId, UserProfile};
    ///
    /// let caller = CallerIdentity::new(UserId::new("u1").expect("id"), "ana@obra.mx");
    /// let profile = UserProfile::for_caller(&caller, Utc::now());
    /// assert_eq!(profile.nombre_completo, "ana");
    /// assert!(profile.activo);
    /// ```
    pub fn for_caller(caller: &CallerIdentity, now: DateTime<Utc>) -> Self {
        Self {
            id: caller.id().clone(),
            email: caller.email().to_owned(),
            nombre_completo: caller.default_display_name().to_owned(),
            empresa: None,
            organizacion: None,
            activo: true,
            fecha_registro: now,
            fecha_actualizacion: now,
        }
    }
}

/// Explicit profile registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfileDraft {
    pub id: UserId,
    pub email: String,
    pub nombre_completo: String,
    pub empresa: Option<String>,
    pub organizacion: Option<String>,
}

impl UserProfileDraft {
    /// Materialise the draft as an active profile.
    pub fn into_profile(self, now: DateTime<Utc>) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
            nombre_completo: self.nombre_completo,
            empresa: self.empresa,
            organizacion: self.organizacion,
            activo: true,
            fecha_registro: now,
            fecha_actualizacion: now,
        }
    }
}

/// Partial update of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfilePatch {
    pub nombre_completo: Option<String>,
    pub empresa: Option<String>,
    pub organizacion: Option<String>,
    pub activo: Option<bool>,
}

impl UserProfilePatch {
    /// Merge onto `profile`.
    pub fn apply(self, profile: UserProfile, now: DateTime<Utc>) -> UserProfile {
        UserProfile {
            nombre_completo: self.nombre_completo.unwrap_or(profile.nombre_completo),
            empresa: self.empresa.or(profile.empresa),
            organizacion: self.organizacion.or(profile.organizacion),
            activo: self.activo.unwrap_or(profile.activo),
            fecha_actualizacion: now,
            ..profile
        }
    }
}
