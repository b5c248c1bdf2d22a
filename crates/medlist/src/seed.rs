//! Built-in doctors shipped with the program.
//!
//! The seed set is never written to storage; it is merged with the persisted
//! overlay on every load.

use crate::record::{CustomFields, DoctorRecord};

#[allow(clippy::too_many_arguments)]
fn doctor(
    id: i64,
    name: &str,
    specialty: &str,
    phone: &str,
    clinic: Option<&str>,
    schedule: Option<&str>,
    address: Option<&str>,
    experience: Option<u32>,
) -> DoctorRecord {
    DoctorRecord {
        id,
        name: name.to_string(),
        specialty: specialty.to_string(),
        phone: phone.to_string(),
        clinic: clinic.map(str::to_string),
        schedule: schedule.map(str::to_string),
        address: address.map(str::to_string),
        experience,
        custom: CustomFields::new(),
    }
}

/// The built-in seed set, in display order.
#[must_use]
pub fn seed_doctors() -> Vec<DoctorRecord> {
    vec![
        doctor(
            1,
            "Dr. María González",
            "Cardiología",
            "+591 70123456",
            Some("Clínica Santa María"),
            Some("Lun-Vie 8:00-17:00"),
            Some("Av. San Martín #123"),
            Some(15),
        ),
        doctor(
            2,
            "Dr. Carlos Mendoza",
            "Pediatría",
            "+591 71234567",
            Some("Hospital Infantil"),
            Some("Lun-Sáb 9:00-18:00"),
            None,
            Some(12),
        ),
        doctor(
            3,
            "Dra. Ana Rodríguez",
            "Dermatología",
            "+591 72345678",
            None,
            Some("Mar-Vie 14:00-19:00"),
            Some("Calle Bolívar #456"),
            None,
        ),
        doctor(
            4,
            "Dr. Luis Torres",
            "Traumatología",
            "+591 73456789",
            Some("Centro Médico Los Andes"),
            None,
            None,
            Some(20),
        ),
        doctor(
            5,
            "Dra. Carmen Silva",
            "Ginecología",
            "+591 74567890",
            None,
            Some("Lun-Vie 10:00-16:00"),
            Some("Av. América #789"),
            Some(8),
        ),
    ]
}
