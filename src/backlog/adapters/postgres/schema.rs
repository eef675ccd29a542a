//! Diesel schema for backlog persistence.

diesel::table! {
    /// Milestones (sprints) grouping user stories.
    milestones (id) {
        /// Milestone identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// User stories with their backlog and sprint ordering keys.
    user_stories (id) {
        /// Story identifier.
        id -> Uuid,
        /// Owning project.
        project_id -> Uuid,
        /// Story subject.
        #[max_length = 500]
        subject -> Varchar,
        /// Milestone the story is planned into; `NULL` for the backlog.
        milestone_id -> Nullable<Uuid>,
        /// Position inside the backlog.
        backlog_order -> Int8,
        /// Position inside the milestone.
        sprint_order -> Int8,
        /// Optimistic-concurrency version.
        version -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        modified_at -> Timestamptz,
    }
}

diesel::table! {
    /// Reorder version of each group; the backlog row uses the nil UUID.
    backlog_group_versions (project_id, milestone_id) {
        /// Owning project.
        project_id -> Uuid,
        /// Milestone of the group, nil for the backlog.
        milestone_id -> Uuid,
        /// Number of reorders applied to the group.
        version -> Int8,
    }
}

diesel::joinable!(user_stories -> milestones (milestone_id));
diesel::allow_tables_to_appear_in_same_query!(backlog_group_versions, milestones, user_stories);
