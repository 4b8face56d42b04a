use super::definition::HolidayDefinition;

pub fn islamic_holidays() -> Vec<HolidayDefinition> {
    vec![
        HolidayDefinition::lunar(
            "Islamic New Year",
            "رأس السنة الهجرية",
            1,
            1,
            "The first day of the Islamic lunar calendar year.",
        ),
        HolidayDefinition::lunar("Ashura", "عاشوراء", 1, 10, "The 10th day of Muharram."),
        HolidayDefinition::lunar(
            "Prophet's Birthday",
            "عيد المولد النبوي",
            3,
            12,
            "The birthday of the Islamic prophet Muhammad.",
        ),
        HolidayDefinition::lunar(
            "Isra and Mi'raj",
            "الإسراء والمعراج",
            7,
            27,
            "The night journey and ascension of the Prophet Muhammad.",
        ),
        HolidayDefinition::lunar("Mid-Sha'ban", "النصف من شعبان", 8, 15, "The 15th night of Sha'ban."),
        HolidayDefinition::lunar(
            "Start of Ramadan",
            "بداية رمضان",
            9,
            1,
            "The first day of the holy month of fasting.",
        ),
        HolidayDefinition::lunar(
            "Eid al-Fitr",
            "عيد الفطر",
            10,
            1,
            "Festival of Breaking the Fast, marking the end of Ramadan.",
        ),
        HolidayDefinition::lunar("Arafat Day", "يوم عرفة", 12, 9, "The day before Eid al-Adha."),
        HolidayDefinition::lunar("Eid al-Adha", "عيد الأضحى", 12, 10, "Festival of the Sacrifice."),
    ]
}
