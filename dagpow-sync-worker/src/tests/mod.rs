// Copyright (c) 2022 MASSA LABS <info@massa.net>

mod admission_scenarios;
mod range_sync_scenarios;
mod tools;
