//! Built-in seed data used on first launch and by legacy-blob migration.

use crate::model::board::{BoardData, Tag, Task, TaskList};

const DEFAULT_BOARD_TITLE: &str = "Rotina de Autoamor";
const DEFAULT_BOARD_DESCRIPTION: &str = "Um aplicativo para organizar suas tarefas.";

const DEFAULT_TAGS: &[(&str, &str, &str)] = &[
    ("tag-1", "Manhã", "#FFD580"),
    ("tag-2", "Tarde", "#ADD8E6"),
    ("tag-3", "Noite", "#D8BFD8"),
    ("tag-4", "Semanal", "#90EE90"),
    ("tag-5", "Importante", "#FFA07A"),
    ("tag-6", "Pessoal", "#FFCC99"),
];

type SeedTask = (&'static str, &'static str, &'static [&'static str]);

const DEFAULT_LISTS: &[(&str, &str, &[SeedTask])] = &[
    (
        "1",
        "Sono e Despertar",
        &[
            ("1-1", "Dormir às 23h", &["tag-3"]),
            ("1-2", "Acordar às 7h", &["tag-1"]),
            ("1-3", "Ritual pré-sono (banho morno, leitura leve)", &["tag-3"]),
            ("1-4", "Evitar telas e cafeína +/-2h antes de dormir", &["tag-3"]),
        ],
    ),
    (
        "2",
        "Exercício Matinal",
        &[
            ("2-1", "Caminhar 30 min às 8h", &["tag-1"]),
            ("2-2", "Registrar passos ou distância", &["tag-1"]),
        ],
    ),
    (
        "3",
        "Alimentação",
        &[
            ("3-1", "Café da manhã (proteína + fruta) às 7h", &["tag-1"]),
            ("3-2", "Almoço mediterrâneo às 11h", &["tag-2"]),
            ("3-3", "Lanche leve (oleaginosas ou iogurte) às 15h", &["tag-2"]),
            ("3-4", "Jantar leve às 19h", &["tag-3"]),
        ],
    ),
    (
        "4",
        "Autocuidado & Hobbies",
        &[
            ("4-1", "Escrever no diário 20 min", &["tag-6", "tag-4"]),
            ("4-2", "Desenhar 20 min", &["tag-6"]),
            ("4-3", "Maquiagem e autocuidado 15 min", &["tag-1", "tag-6"]),
        ],
    ),
    (
        "5",
        "Estudo (Pomodoro)",
        &[
            ("5-1", "14h-16h: 4 Pomodoros (25 min estudo + 5 min pausa)", &["tag-2"]),
            ("5-2", "16h15-19h: Revisão leve e leitura", &["tag-3"]),
        ],
    ),
    (
        "6",
        "Terapia & Medicação",
        &[
            ("6-1", "Terapia semanal (dia e hora)", &["tag-4", "tag-5"]),
            ("6-2", "Tomar Bupropiona ao acordar", &["tag-1", "tag-5"]),
            ("6-3", "Tomar Aripiprazol ao dormir", &["tag-3", "tag-5"]),
        ],
    ),
];

/// Tags injected into fresh boards and into legacy blobs without tags.
pub fn default_tags() -> Vec<Tag> {
    DEFAULT_TAGS
        .iter()
        .map(|(id, name, color)| Tag {
            id: (*id).to_string(),
            name: (*name).to_string(),
            color: (*color).to_string(),
        })
        .collect()
}

/// Seeded self-care routine shown on first launch.
pub fn default_board() -> BoardData {
    let lists = DEFAULT_LISTS
        .iter()
        .map(|(id, title, tasks)| TaskList {
            id: (*id).to_string(),
            title: (*title).to_string(),
            tasks: tasks
                .iter()
                .map(|(task_id, task_title, tags)| Task {
                    id: (*task_id).to_string(),
                    title: (*task_title).to_string(),
                    description: None,
                    due_date: None,
                    completed: false,
                    image_uri: None,
                    completed_at: None,
                    tags: tags.iter().map(|tag| (*tag).to_string()).collect(),
                })
                .collect(),
        })
        .collect();

    BoardData {
        title: DEFAULT_BOARD_TITLE.to_string(),
        description: DEFAULT_BOARD_DESCRIPTION.to_string(),
        lists,
        tags: default_tags(),
        active_filter: None,
    }
}
