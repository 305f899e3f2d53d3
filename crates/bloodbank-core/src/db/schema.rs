//! SQLite schema definition.

/// Complete database schema for the blood bank.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Hospitals
-- ============================================================================

CREATE TABLE IF NOT EXISTS hospitals (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    address TEXT NOT NULL,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    pincode TEXT,
    latitude REAL NOT NULL CHECK (latitude BETWEEN -90 AND 90),
    longitude REAL NOT NULL CHECK (longitude BETWEEN -180 AND 180),
    contact TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- ============================================================================
-- Users (donors, patients, staff)
-- ============================================================================

CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    date_of_birth TEXT,                          -- YYYY-MM-DD
    gender TEXT,
    contact TEXT,
    email TEXT,
    blood_group TEXT NOT NULL,
    user_type TEXT NOT NULL CHECK (user_type IN ('DONOR', 'PATIENT', 'STAFF')),
    last_donation TEXT,
    is_eligible INTEGER NOT NULL DEFAULT 1,
    weight REAL,
    hemoglobin REAL,
    hospital_id TEXT REFERENCES hospitals(id) ON DELETE SET NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_hospital ON users(hospital_id);
CREATE INDEX IF NOT EXISTS idx_users_name ON users(name);

-- ============================================================================
-- Camps
-- ============================================================================

CREATE TABLE IF NOT EXISTS camps (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    latitude REAL,
    longitude REAL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    organizer TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK (end_date >= start_date)
);

-- ============================================================================
-- Donation Events (immutable apart from administrative corrections)
-- ============================================================================

CREATE TABLE IF NOT EXISTS donation_events (
    id TEXT PRIMARY KEY,
    donor_id TEXT NOT NULL REFERENCES users(id),
    hospital_id TEXT REFERENCES hospitals(id),
    camp_id TEXT REFERENCES camps(id),
    date TEXT NOT NULL,
    units_donated INTEGER NOT NULL CHECK (units_donated > 0),
    created_at TEXT NOT NULL,
    CHECK (hospital_id IS NOT NULL OR camp_id IS NOT NULL)
);

CREATE INDEX IF NOT EXISTS idx_donations_donor ON donation_events(donor_id);
CREATE INDEX IF NOT EXISTS idx_donations_hospital ON donation_events(hospital_id);
CREATE INDEX IF NOT EXISTS idx_donations_camp ON donation_events(camp_id);

-- ============================================================================
-- Inventory Batches
-- ============================================================================

-- A batch never holds zero units: fully consumed batches are deleted.
CREATE TABLE IF NOT EXISTS inventory_batches (
    id TEXT PRIMARY KEY,
    hospital_id TEXT NOT NULL REFERENCES hospitals(id) ON DELETE CASCADE,
    blood_group TEXT NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    expiry_date TEXT NOT NULL,
    donation_id TEXT REFERENCES donation_events(id) ON DELETE SET NULL,
    min_quantity INTEGER NOT NULL DEFAULT 0 CHECK (min_quantity >= 0),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- FIFO scans: oldest-expiring first within (hospital, group)
CREATE INDEX IF NOT EXISTS idx_batches_fifo
    ON inventory_batches(hospital_id, blood_group, expiry_date);
CREATE INDEX IF NOT EXISTS idx_batches_donation ON inventory_batches(donation_id);

-- ============================================================================
-- Blood Requests
-- ============================================================================

CREATE TABLE IF NOT EXISTS blood_requests (
    id TEXT PRIMARY KEY,
    receiver_id TEXT NOT NULL REFERENCES users(id),
    hospital_id TEXT REFERENCES hospitals(id) ON DELETE SET NULL,
    blood_group TEXT NOT NULL,
    units_required INTEGER NOT NULL CHECK (units_required > 0),
    is_emergency INTEGER NOT NULL DEFAULT 0,
    latitude REAL,
    longitude REAL,
    status TEXT NOT NULL DEFAULT 'PENDING'
        CHECK (status IN ('PENDING', 'FULFILLED', 'CANCELLED')),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_requests_hospital ON blood_requests(hospital_id);
CREATE INDEX IF NOT EXISTS idx_requests_status ON blood_requests(status);
"#;
